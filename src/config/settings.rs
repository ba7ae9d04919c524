use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_minutes() -> u32 {
    25
}
fn default_break_minutes() -> u32 {
    5
}
fn default_presets() -> Vec<u32> {
    vec![15, 25, 45, 60]
}
fn default_max_minutes() -> u32 {
    180
}
fn default_daily_goal() -> u32 {
    60
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusConfig {
    #[serde(default = "default_minutes")]
    pub default_minutes: u32,
    #[serde(default = "default_break_minutes")]
    pub break_minutes: u32,
    /// Quick-pick durations offered before a session.
    #[serde(default = "default_presets")]
    pub presets: Vec<u32>,
    #[serde(default = "default_max_minutes")]
    pub max_minutes: u32,
    /// Minutes per day that count as a "full" day in the weekly grid.
    #[serde(default = "default_daily_goal")]
    pub daily_goal_minutes: u32,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            default_minutes: default_minutes(),
            break_minutes: default_break_minutes(),
            presets: default_presets(),
            max_minutes: default_max_minutes(),
            daily_goal_minutes: default_daily_goal(),
        }
    }
}

impl FocusConfig {
    /// Checks a requested session length against `1..=max_minutes`.
    pub fn validate_minutes(&self, minutes: u32) -> Result<u32> {
        if minutes == 0 || minutes > self.max_minutes {
            anyhow::bail!(
                "Session length must be between 1 and {} minutes (got {})",
                self.max_minutes,
                minutes
            );
        }
        Ok(minutes)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BlockingConfig {
    /// Count terminal focus-loss during sessions as distractions.
    #[serde(default)]
    pub enabled: bool,
    /// Apps that never count as distractions.
    #[serde(default)]
    pub whitelist: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_true")]
    pub show_motivation: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_motivation: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub focus: FocusConfig,
    #[serde(default)]
    pub blocking: BlockingConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "focusforge")
            .context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn db_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("focusforge.db"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(&path).with_context(|| format!("Reading {:?}", path))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content).context("Parsing config.toml")?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Serializing config")
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, self.to_toml()?).with_context(|| format!("Writing {:?}", path))?;
        Ok(())
    }

    pub fn ensure_data_dir() -> Result<PathBuf> {
        let dir = Self::data_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}
