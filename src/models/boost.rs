use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A purchased, time-bounded XP multiplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Boost {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub multiplier: u32,
    pub expires_at: DateTime<Utc>,
}

impl Boost {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    /// Seconds left before expiry, zero once expired.
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }
}
