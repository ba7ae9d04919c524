use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "focusforge", version, author, about = "A terminal focus companion that turns deep work into levels, streaks and rewards")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start a focus session right away
    Focus {
        /// Session length in minutes (defaults to focus.default_minutes)
        #[arg(short, long)]
        minutes: Option<u32>,
        /// What you are working on
        #[arg(short, long)]
        task: Option<String>,
    },
    /// Show level, rank, coins and streak
    Profile,
    /// Browse and buy shop items
    Shop {
        #[command(subcommand)]
        action: ShopCommands,
    },
    /// List active XP boosts
    Boosts,
    /// Show statistics
    Stats {
        /// Show a heatmap for the last 7 days
        #[arg(long)]
        week: bool,
    },
    /// Distraction counter
    Distractions {
        #[command(subcommand)]
        action: Option<DistractionCommands>,
    },
    /// Reset the profile to a fresh start
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Show the active configuration
    Config {
        /// Write the default configuration file
        #[arg(long)]
        init: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ShopCommands {
    /// Show the catalog and your balance
    List,
    /// Buy an item by id
    Buy {
        /// Item id (e.g. double_xp_30, streak_freeze)
        item: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum DistractionCommands {
    /// Clear the distraction counter
    Reset,
    /// Check whether an app would count as a distraction during a session
    Check {
        /// App name
        app: String,
    },
}
