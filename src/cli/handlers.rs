use anyhow::{Context, Result};
use rusqlite::Connection;
use std::io::{self, BufRead, Write};

use crate::cli::args::{DistractionCommands, ShopCommands};
use crate::clock::Clock;
use crate::config::AppConfig;
use crate::db::repository::SessionRepo;
use crate::db::store::MetaStore;
use crate::engine::{DistractionTracker, ProgressionEngine, Purchase, Shop};
use crate::models::{find_item, ItemCategory, ItemEffect, CATALOG};
use crate::utils::format::{format_minutes, format_remaining, pad_to, progress_bar};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const EMBER: &str = "\x1b[38;2;232;118;58m";

// ─── Profile ─────────────────────────────────────────────────────────────────

pub fn handle_profile(conn: &Connection, clock: &dyn Clock) -> Result<()> {
    let store = MetaStore::new(conn);
    let engine = ProgressionEngine::load(&store, clock)?;
    let p = engine.profile();

    println!();
    println_colored!(EMBER, "  {}  ·  Level {}", p.rank(), p.level());
    println!();
    println!(
        "  XP:        {} {}/100  ({} total)",
        progress_bar(p.xp_into_level() as u32, 100, 20),
        p.xp_into_level(),
        p.xp
    );
    if let Some(next) = p.next_rank() {
        println_colored!(DIM, "             next rank: {} at level {}", next.name, next.min_level);
    }
    println_colored!(AMBER, "  Coins:     {}", p.coins);
    println_colored!(
        BOLD,
        "  Streak:    {} days  ·  {} freeze(s)",
        p.streak,
        p.streak_freezes
    );
    println!(
        "  Focused:   {} across {} sessions",
        format_minutes(p.total_focus_minutes),
        p.total_sessions
    );

    let multiplier = engine.active_xp_multiplier();
    if multiplier > 1 {
        println_colored!(GREEN, "  Boost:     x{} XP active", multiplier);
    }
    println!();
    Ok(())
}

// ─── Shop ────────────────────────────────────────────────────────────────────

pub fn handle_shop(conn: &Connection, clock: &dyn Clock, action: &ShopCommands) -> Result<()> {
    let store = MetaStore::new(conn);
    let mut engine = ProgressionEngine::load(&store, clock)?;
    let mut shop = Shop::load(&store)?;

    match action {
        ShopCommands::List => {
            let coins = engine.profile().coins;
            println!();
            println_colored!(EMBER, "  Shop  ·  {} coins", coins);

            for category in [ItemCategory::Boost, ItemCategory::Utility, ItemCategory::Cosmetic] {
                println!();
                println_colored!(BOLD, "  {}", category.display_name());
                for item in CATALOG.iter().filter(|i| i.effect.category() == category) {
                    let status = if item.effect == ItemEffect::Medal && shop.owns(item.id) {
                        format!("{}owned\x1b[0m", GREEN)
                    } else if shop.can_afford(item, coins) {
                        format!("{}{} coins\x1b[0m", AMBER, item.price)
                    } else {
                        format!("{}{} coins\x1b[0m", DIM, item.price)
                    };
                    println!(
                        "  {}  {}  {}",
                        pad_to(item.id, 14),
                        pad_to(&format!("{}: {}", item.name, item.description), 64),
                        status
                    );
                }
            }
            println!();
            println_colored!(DIM, "  Buy with: focusforge shop buy <id>");
            println!();
        }
        ShopCommands::Buy { item } => match shop.purchase(&mut engine, item)? {
            Purchase::Boost(boost) => {
                println_colored!(
                    GREEN,
                    "  ✓ {} active for {} (x{} XP)",
                    boost.name,
                    format_remaining(boost.remaining_secs(clock.now_utc())),
                    boost.multiplier
                );
            }
            Purchase::StreakFreeze { freezes } => {
                println_colored!(GREEN, "  ✓ Streak freeze added ({} in reserve)", freezes);
            }
            Purchase::Xp { awarded } => {
                let p = engine.profile();
                println_colored!(
                    GREEN,
                    "  ✓ +{} XP, now level {} ({})",
                    awarded,
                    p.level(),
                    p.rank()
                );
            }
            Purchase::Medal => {
                let name = find_item(item).map(|i| i.name).unwrap_or(item.as_str());
                println_colored!(GREEN, "  ✓ You've acquired {}!", name);
            }
        },
    }
    Ok(())
}

// ─── Boosts ──────────────────────────────────────────────────────────────────

pub fn handle_boosts(conn: &Connection, clock: &dyn Clock) -> Result<()> {
    let store = MetaStore::new(conn);
    let mut engine = ProgressionEngine::load(&store, clock)?;
    engine.sweep_expired_boosts()?;

    let now = clock.now_utc();
    let active: Vec<_> = engine.boosts().active(now).collect();

    println!();
    if active.is_empty() {
        println_colored!(DIM, "  No active boosts");
    } else {
        println_colored!(EMBER, "  Active Boosts  ·  x{} XP", engine.active_xp_multiplier());
        println!();
        for boost in active {
            println!(
                "  {}  {}",
                pad_to(&boost.name, 16),
                format_remaining(boost.remaining_secs(now))
            );
        }
    }
    println!();
    Ok(())
}

// ─── Stats ───────────────────────────────────────────────────────────────────

pub fn handle_stats(conn: &Connection, config: &AppConfig, clock: &dyn Clock, week: bool) -> Result<()> {
    let store = MetaStore::new(conn);
    let engine = ProgressionEngine::load(&store, clock)?;
    let p = engine.profile();
    let best = SessionRepo::best_streak(conn)?;
    let grid = SessionRepo::weekly_grid(conn, clock.today())?;

    println!();
    println_colored!(EMBER, "  Statistics");
    println!();
    println_colored!(
        BOLD,
        "  Streak:       {} days current  |  {} days best",
        p.streak,
        best.max(p.streak)
    );
    println!("  Focus time:   {}", format_minutes(p.total_focus_minutes));
    println!("  Sessions:     {}", p.total_sessions);
    println!(
        "  Last 7 days:  {} over {} day(s)",
        format_minutes(u64::from(grid.total_minutes())),
        grid.active_days()
    );

    if week {
        let goal = config.focus.daily_goal_minutes;
        println!();
        println_colored!(
            DIM,
            "  Last 7 days  (● = {}m goal met, ◑ = some focus, ○ = none)",
            goal
        );
        println!();
        print!("  ");
        for day in &grid.days {
            let icon = if day.sessions == 0 {
                format!("{}○\x1b[0m ", DIM)
            } else if day.goal_ratio(goal) >= 1.0 {
                format!("{}●\x1b[0m ", GREEN)
            } else {
                format!("{}◑\x1b[0m ", AMBER)
            };
            print!("{}", icon);
        }
        println!();
    }

    println!();
    Ok(())
}

// ─── Distractions ────────────────────────────────────────────────────────────

pub fn handle_distractions(
    conn: &Connection,
    config: &AppConfig,
    action: Option<&DistractionCommands>,
) -> Result<()> {
    let store = MetaStore::new(conn);
    let mut tracker = DistractionTracker::load(&store, &config.blocking)?;

    match action {
        None => {
            println!();
            if tracker.is_enabled() {
                println_colored!(BOLD, "  Distractions recorded: {}", tracker.count());
            } else {
                println_colored!(DIM, "  Distraction tracking is off (set blocking.enabled in config.toml)");
                println!("  Distractions recorded: {}", tracker.count());
            }
            println!();
        }
        Some(DistractionCommands::Reset) => {
            tracker.reset()?;
            println_colored!(GREEN, "  ✓ Distraction counter cleared");
        }
        Some(DistractionCommands::Check { app }) => {
            tracker.start();
            if tracker.is_blocked(app) {
                println_colored!(RED, "  ✗ {} counts as a distraction during sessions", app);
            } else if tracker.is_enabled() {
                println_colored!(GREEN, "  ✓ {} is whitelisted", app);
            } else {
                println_colored!(DIM, "  Distraction tracking is off");
            }
        }
    }
    Ok(())
}

// ─── Reset ───────────────────────────────────────────────────────────────────

pub fn handle_reset(conn: &Connection, clock: &dyn Clock, yes: bool) -> Result<()> {
    if !yes {
        let answer = prompt("  Reset level, XP, coins and streak? This cannot be undone [y/N] ")?;
        if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
            println_colored!(DIM, "  Nothing changed");
            return Ok(());
        }
    }
    let store = MetaStore::new(conn);
    let mut engine = ProgressionEngine::load(&store, clock)?;
    engine.reset_profile()?;
    println_colored!(AMBER, "  Profile reset. Welcome back, Wanderer");
    Ok(())
}

// ─── Config ──────────────────────────────────────────────────────────────────

pub fn handle_config(config: &AppConfig, init: bool) -> Result<()> {
    let path = AppConfig::config_path()?;
    if init {
        if path.exists() {
            println_colored!(AMBER, "  {:?} already exists, leaving it untouched", path);
            return Ok(());
        }
        AppConfig::default().save().context("Writing default config")?;
        println_colored!(GREEN, "  ✓ Wrote {:?}", path);
        return Ok(());
    }
    println_colored!(DIM, "  # {:?}", path);
    println!("{}", config.to_toml()?);
    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut buf = String::new();
    io::stdin().lock().read_line(&mut buf)?;
    Ok(buf.trim_end_matches('\n').trim_end_matches('\r').to_string())
}
