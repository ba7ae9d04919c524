//! Experience, levels, coins and streaks.
//!
//! Every mutation builds the next [`Profile`] from the current one, writes it
//! to the store as a single blob and only then swaps it in, so a failed write
//! leaves the engine untouched.

use chrono::NaiveDate;

use crate::clock::Clock;
use crate::db::store::{KeyValueStore, PROFILE_KEY};
use crate::engine::boosts::BoostRegistry;
use crate::error::{ForgeError, Result};
use crate::models::{Boost, Profile, StoredProfile};

pub const XP_PER_MINUTE: u64 = 2;
pub const COINS_PER_MINUTE: u64 = 2;

/// What a completed session paid out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReward {
    pub minutes: u32,
    pub xp_earned: u64,
    pub coins_earned: u64,
    pub multiplier: u32,
    pub streak: u32,
    pub freeze_used: bool,
    /// Set when the session crossed into a new level.
    pub new_level: Option<u32>,
    /// Set when the new level also unlocked a new rank.
    pub new_rank: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreakStep {
    SameDay,
    Continued,
    Frozen,
    Restarted,
}

/// How the streak moves when activity lands on `today`.
fn streak_step(
    last: Option<NaiveDate>,
    today: NaiveDate,
    freezes: u32,
    allow_freeze: bool,
) -> StreakStep {
    match last {
        Some(day) if day == today => StreakStep::SameDay,
        Some(day) if today.pred_opt() == Some(day) => StreakStep::Continued,
        _ if allow_freeze && freezes > 0 => StreakStep::Frozen,
        _ => StreakStep::Restarted,
    }
}

pub struct ProgressionEngine<'a> {
    store: &'a dyn KeyValueStore,
    clock: &'a dyn Clock,
    profile: Profile,
    boosts: BoostRegistry<'a>,
}

impl<'a> ProgressionEngine<'a> {
    /// Loads the profile and boost set. Missing or unreadable blobs fall back
    /// to defaults.
    pub fn load(store: &'a dyn KeyValueStore, clock: &'a dyn Clock) -> Result<Self> {
        let profile = match store.get(PROFILE_KEY)? {
            None => Profile::default(),
            Some(raw) => match serde_json::from_str::<StoredProfile>(&raw) {
                Ok(stored) => stored.into_profile(),
                Err(e) => {
                    log::warn!("Discarding unreadable profile: {}", e);
                    Profile::default()
                }
            },
        };
        let boosts = BoostRegistry::load(store)?;
        Ok(Self {
            store,
            clock,
            profile,
            boosts,
        })
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn boosts(&self) -> &BoostRegistry<'a> {
        &self.boosts
    }

    pub fn clock(&self) -> &'a dyn Clock {
        self.clock
    }

    pub fn active_xp_multiplier(&self) -> u32 {
        self.boosts.active_multiplier(self.clock.now_utc())
    }

    /// Adds XP, multiplied by the active boost when `apply_boost` is set.
    /// Returns the XP actually awarded.
    pub fn add_xp(&mut self, amount: u64, apply_boost: bool) -> Result<u64> {
        let multiplier = if apply_boost {
            self.active_xp_multiplier()
        } else {
            1
        };
        let awarded = amount.saturating_mul(u64::from(multiplier));
        let mut next = self.profile.clone();
        next.xp = next.xp.saturating_add(awarded);
        self.commit(next)?;
        Ok(awarded)
    }

    /// Applies a signed coin delta. Refuses to take the balance below zero.
    pub fn add_coins(&mut self, amount: i64) -> Result<u64> {
        let current = self.profile.coins;
        let balance = if amount >= 0 {
            current.saturating_add(amount.unsigned_abs())
        } else {
            let cost = amount.unsigned_abs();
            current
                .checked_sub(cost)
                .ok_or(ForgeError::InsufficientBalance {
                    needed: cost,
                    available: current,
                })?
        };
        let mut next = self.profile.clone();
        next.coins = balance;
        self.commit(next)?;
        Ok(balance)
    }

    /// Marks today as active without awarding anything. Never spends a freeze.
    pub fn update_streak(&mut self) -> Result<()> {
        let today = self.clock.today();
        let step = streak_step(self.profile.last_session_date, today, 0, false);
        if step == StreakStep::SameDay {
            return Ok(());
        }
        let mut next = self.profile.clone();
        next.streak = match step {
            StreakStep::Continued => next.streak.saturating_add(1),
            _ => 1,
        };
        next.last_session_date = Some(today);
        self.commit(next)
    }

    /// Pays out a finished focus session and advances the streak, all in one
    /// persisted write.
    pub fn complete_session(&mut self, minutes: u32) -> Result<SessionReward> {
        if minutes == 0 {
            return Err(ForgeError::invalid("minutes", "a session lasts at least 1 minute"));
        }
        let multiplier = self.active_xp_multiplier();
        let base = u64::from(minutes) * XP_PER_MINUTE;
        let xp_earned = base.saturating_mul(u64::from(multiplier));
        let coins_earned = u64::from(minutes) * COINS_PER_MINUTE;
        let today = self.clock.today();

        let prev = &self.profile;
        let mut next = prev.clone();
        next.xp = prev.xp.saturating_add(xp_earned);
        next.coins = prev.coins.saturating_add(coins_earned);

        let step = streak_step(prev.last_session_date, today, prev.streak_freezes, true);
        match step {
            StreakStep::SameDay => {}
            StreakStep::Continued => next.streak = prev.streak.saturating_add(1),
            StreakStep::Frozen => next.streak_freezes = prev.streak_freezes - 1,
            StreakStep::Restarted => next.streak = 1,
        }

        next.last_session_date = Some(today);
        next.total_focus_minutes = prev.total_focus_minutes.saturating_add(u64::from(minutes));
        next.total_sessions = prev.total_sessions.saturating_add(1);

        let old_level = prev.level();
        let old_rank = prev.rank();
        let reward = SessionReward {
            minutes,
            xp_earned,
            coins_earned,
            multiplier,
            streak: next.streak,
            freeze_used: step == StreakStep::Frozen,
            new_level: (next.level() > old_level).then(|| next.level()),
            new_rank: (next.rank() != old_rank).then(|| next.rank()),
        };

        self.commit(next)?;
        log::info!(
            "Session complete: {} min, +{} XP (x{}), +{} coins, streak {}{}",
            minutes,
            reward.xp_earned,
            reward.multiplier,
            reward.coins_earned,
            reward.streak,
            if reward.freeze_used { " (freeze used)" } else { "" }
        );
        Ok(reward)
    }

    pub fn add_streak_freeze(&mut self) -> Result<u32> {
        let mut next = self.profile.clone();
        next.streak_freezes = next.streak_freezes.saturating_add(1);
        let freezes = next.streak_freezes;
        self.commit(next)?;
        Ok(freezes)
    }

    /// Wipes the profile back to defaults. Boosts and owned items are left alone.
    pub fn reset_profile(&mut self) -> Result<()> {
        self.commit(Profile::default())?;
        log::info!("Profile reset");
        Ok(())
    }

    pub fn purchase_boost(
        &mut self,
        id: &str,
        name: &str,
        multiplier: u32,
        minutes: u32,
    ) -> Result<Boost> {
        let now = self.clock.now_utc();
        self.boosts.purchase_boost(id, name, multiplier, minutes, now)
    }

    pub fn sweep_expired_boosts(&mut self) -> Result<Vec<Boost>> {
        let now = self.clock.now_utc();
        self.boosts.sweep_expired(now)
    }

    fn commit(&mut self, next: Profile) -> Result<()> {
        let raw = serde_json::to_string(&StoredProfile::from(&next))?;
        self.store.set(PROFILE_KEY, &raw)?;
        self.profile = next;
        Ok(())
    }
}
