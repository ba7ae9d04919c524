mod cli;
mod clock;
mod config;
mod db;
mod engine;
mod error;
mod models;
mod tui;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use rusqlite::Connection;

use cli::args::{Cli, Commands};
use cli::handlers;
use clock::SystemClock;
use config::AppConfig;
use db::migrations::run_migrations;
use tui::app::QuickStart;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Loading config")?;

    AppConfig::ensure_data_dir()?;
    let db_path = AppConfig::db_path()?;
    let conn = Connection::open(&db_path)
        .with_context(|| format!("Opening database at {:?}", db_path))?;

    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    run_migrations(&conn)?;

    let clock = SystemClock;

    match cli.command {
        Some(Commands::Focus { minutes, task }) => {
            let minutes = config
                .focus
                .validate_minutes(minutes.unwrap_or(config.focus.default_minutes))?;
            tui::app::run(&conn, config, Some(QuickStart { minutes, task }))?;
        }
        Some(Commands::Profile) => handlers::handle_profile(&conn, &clock)?,
        Some(Commands::Shop { action }) => handlers::handle_shop(&conn, &clock, &action)?,
        Some(Commands::Boosts) => handlers::handle_boosts(&conn, &clock)?,
        Some(Commands::Stats { week }) => handlers::handle_stats(&conn, &config, &clock, week)?,
        Some(Commands::Distractions { action }) => {
            handlers::handle_distractions(&conn, &config, action.as_ref())?
        }
        Some(Commands::Reset { yes }) => handlers::handle_reset(&conn, &clock, yes)?,
        Some(Commands::Config { init }) => handlers::handle_config(&config, init)?,

        // No subcommand → launch TUI
        None => tui::app::run(&conn, config, None)?,
    }

    Ok(())
}
