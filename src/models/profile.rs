use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const XP_PER_LEVEL: u64 = 100;
pub const PROFILE_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankTier {
    pub min_level: u32,
    pub name: &'static str,
}

const fn tier(min_level: u32, name: &'static str) -> RankTier {
    RankTier { min_level, name }
}

/// Ascending by `min_level`.
pub const RANKS: &[RankTier] = &[
    tier(1, "Wanderer"),
    tier(5, "Awakened"),
    tier(15, "Intent"),
    tier(215, "Disciplined"),
    tier(376, "Diligent"),
    tier(543, "Unshakened"),
    tier(770, "Visionary"),
    tier(1045, "Liberated"),
    tier(1380, "Transcendent"),
];

pub fn level_from_xp(xp: u64) -> u32 {
    u32::try_from(xp / XP_PER_LEVEL)
        .unwrap_or(u32::MAX - 1)
        .saturating_add(1)
}

/// Label of the highest tier whose `min_level <= level`. Scans from the top so
/// the last qualifying tier wins; falls back to the first tier.
pub fn rank_from_level(level: u32, tiers: &[RankTier]) -> &'static str {
    tiers
        .iter()
        .rev()
        .find(|t| level >= t.min_level)
        .or_else(|| tiers.first())
        .map(|t| t.name)
        .unwrap_or_default()
}

/// The user's progression state. `level` and `rank` are always derived from
/// `xp` and are therefore not stored as fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub xp: u64,
    pub coins: u64,
    pub streak: u32,
    pub last_session_date: Option<NaiveDate>,
    pub total_focus_minutes: u64,
    pub total_sessions: u64,
    pub streak_freezes: u32,
}

impl Profile {
    pub fn level(&self) -> u32 {
        level_from_xp(self.xp)
    }

    pub fn rank(&self) -> &'static str {
        rank_from_level(self.level(), RANKS)
    }

    /// XP earned inside the current level (0..XP_PER_LEVEL).
    pub fn xp_into_level(&self) -> u64 {
        self.xp % XP_PER_LEVEL
    }

    /// 0.0 .. 1.0 progress toward the next level.
    pub fn level_progress(&self) -> f64 {
        self.xp_into_level() as f64 / XP_PER_LEVEL as f64
    }

    /// The next rank and the level it unlocks at, if any.
    pub fn next_rank(&self) -> Option<RankTier> {
        let level = self.level();
        RANKS.iter().find(|t| t.min_level > level).copied()
    }
}

// ─── Persisted form ──────────────────────────────────────────────────────────

/// On-disk shape of the profile blob. Every field is optional so partial or
/// older blobs still load; defaults are applied once in `into_profile`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredProfile {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub xp: u64,
    /// Written for readability only, recomputed from `xp` on load.
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub rank: Option<String>,
    #[serde(default)]
    pub coins: u64,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub last_session_date: Option<String>,
    #[serde(default, alias = "totalFocusTime")]
    pub total_focus_minutes: u64,
    #[serde(default)]
    pub total_sessions: u64,
    #[serde(default)]
    pub streak_freezes: u32,
}

impl StoredProfile {
    pub fn into_profile(self) -> Profile {
        let last_session_date = self.last_session_date.as_deref().and_then(|s| {
            let parsed = parse_day(s);
            if parsed.is_none() {
                log::warn!("Ignoring unreadable last session date {:?}", s);
            }
            parsed
        });

        Profile {
            xp: self.xp,
            coins: self.coins,
            streak: self.streak,
            last_session_date,
            total_focus_minutes: self.total_focus_minutes,
            total_sessions: self.total_sessions,
            streak_freezes: self.streak_freezes,
        }
    }
}

impl From<&Profile> for StoredProfile {
    fn from(p: &Profile) -> Self {
        StoredProfile {
            version: PROFILE_VERSION,
            xp: p.xp,
            level: Some(p.level()),
            rank: Some(p.rank().to_string()),
            coins: p.coins,
            streak: p.streak,
            last_session_date: p
                .last_session_date
                .map(|d| d.format("%Y-%m-%d").to_string()),
            total_focus_minutes: p.total_focus_minutes,
            total_sessions: p.total_sessions,
            streak_freezes: p.streak_freezes,
        }
    }
}

/// Accepts ISO days and the "Fri Oct 16 2026" day-string form.
fn parse_day(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%a %b %d %Y"))
        .ok()
}
