use chrono::{DateTime, Duration, Utc};

use crate::db::store::{KeyValueStore, BOOSTS_KEY};
use crate::error::{ForgeError, Result};
use crate::models::Boost;

/// Purchased XP multipliers, persisted as one JSON array.
///
/// Correctness never depends on `sweep_expired` having run: every query
/// filters by `expires_at > now` itself.
pub struct BoostRegistry<'a> {
    store: &'a dyn KeyValueStore,
    boosts: Vec<Boost>,
}

impl<'a> BoostRegistry<'a> {
    pub fn load(store: &'a dyn KeyValueStore) -> Result<Self> {
        let boosts = match store.get(BOOSTS_KEY)? {
            None => Vec::new(),
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("Discarding unreadable boost set: {}", e);
                Vec::new()
            }),
        };
        Ok(Self { store, boosts })
    }

    pub fn all(&self) -> &[Boost] {
        &self.boosts
    }

    pub fn active(&self, now: DateTime<Utc>) -> impl Iterator<Item = &Boost> {
        self.boosts.iter().filter(move |b| b.is_active(now))
    }

    /// 1 when nothing is active, otherwise the largest active multiplier.
    pub fn active_multiplier(&self, now: DateTime<Utc>) -> u32 {
        self.active(now).map(|b| b.multiplier).max().unwrap_or(1)
    }

    pub fn purchase_boost(
        &mut self,
        id: &str,
        name: &str,
        multiplier: u32,
        minutes: u32,
        now: DateTime<Utc>,
    ) -> Result<Boost> {
        if multiplier <= 1 {
            return Err(ForgeError::invalid("multiplier", "must be greater than 1"));
        }
        if minutes == 0 {
            return Err(ForgeError::invalid("minutes", "must be at least 1"));
        }

        let boost = Boost {
            id: id.to_string(),
            name: name.to_string(),
            multiplier,
            expires_at: now + Duration::minutes(i64::from(minutes)),
        };

        let mut next = self.boosts.clone();
        next.push(boost.clone());
        self.commit(next)?;
        log::info!(
            "Boost {} active: x{} until {}",
            boost.id,
            boost.multiplier,
            boost.expires_at
        );
        Ok(boost)
    }

    /// Drops expired boosts and returns them. Writes only when something expired.
    pub fn sweep_expired(&mut self, now: DateTime<Utc>) -> Result<Vec<Boost>> {
        let (live, expired): (Vec<Boost>, Vec<Boost>) =
            self.boosts.iter().cloned().partition(|b| b.is_active(now));
        if expired.is_empty() {
            return Ok(expired);
        }
        self.commit(live)?;
        log::debug!("Swept {} expired boost(s)", expired.len());
        Ok(expired)
    }

    fn commit(&mut self, next: Vec<Boost>) -> Result<()> {
        let raw = serde_json::to_string(&next)?;
        self.store.set(BOOSTS_KEY, &raw)?;
        self.boosts = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::MemoryStore;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap()
    }

    #[test]
    fn no_boosts_means_multiplier_one() {
        let store = MemoryStore::new();
        let registry = BoostRegistry::load(&store).unwrap();
        assert_eq!(registry.active_multiplier(t0()), 1);
    }

    #[test]
    fn expired_boost_is_excluded_and_max_wins() {
        let store = MemoryStore::new();
        let mut registry = BoostRegistry::load(&store).unwrap();
        registry
            .purchase_boost("triple_xp_30", "3x", 3, 30, t0() - Duration::hours(2))
            .unwrap();
        registry.purchase_boost("double_xp_60", "2x", 2, 60, t0()).unwrap();

        assert_eq!(registry.active_multiplier(t0()), 2);
    }

    #[test]
    fn multipliers_do_not_stack() {
        let store = MemoryStore::new();
        let mut registry = BoostRegistry::load(&store).unwrap();
        registry.purchase_boost("a", "2x", 2, 30, t0()).unwrap();
        registry.purchase_boost("b", "2x", 2, 60, t0()).unwrap();
        registry.purchase_boost("c", "3x", 3, 10, t0()).unwrap();

        assert_eq!(registry.all().len(), 3);
        assert_eq!(registry.active_multiplier(t0()), 3);
        // After the 3x lapses the longer 2x boosts still apply.
        assert_eq!(registry.active_multiplier(t0() + Duration::minutes(10)), 2);
        assert_eq!(registry.active_multiplier(t0() + Duration::minutes(60)), 1);
    }

    #[test]
    fn expiry_is_exclusive() {
        let store = MemoryStore::new();
        let mut registry = BoostRegistry::load(&store).unwrap();
        let boost = registry.purchase_boost("a", "2x", 2, 1, t0()).unwrap();
        assert_eq!(boost.expires_at, t0() + Duration::seconds(60));
        assert_eq!(registry.active_multiplier(boost.expires_at), 1);
    }

    #[test]
    fn sweep_returns_expired_and_persists() {
        let store = MemoryStore::new();
        let mut registry = BoostRegistry::load(&store).unwrap();
        registry.purchase_boost("short", "2x", 2, 5, t0()).unwrap();
        registry.purchase_boost("long", "3x", 3, 50, t0()).unwrap();

        let later = t0() + Duration::minutes(10);
        let before = registry.active_multiplier(later);
        let expired = registry.sweep_expired(later).unwrap();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, "short");
        assert_eq!(registry.active_multiplier(later), before);

        let reloaded = BoostRegistry::load(&store).unwrap();
        assert_eq!(reloaded.all().len(), 1);
        assert_eq!(reloaded.all()[0].id, "long");
    }

    #[test]
    fn sweep_with_nothing_expired_does_not_write() {
        let store = MemoryStore::new();
        let mut registry = BoostRegistry::load(&store).unwrap();
        assert!(registry.sweep_expired(t0()).unwrap().is_empty());
        assert_eq!(store.get(BOOSTS_KEY).unwrap(), None);
    }

    #[test]
    fn rejects_invalid_purchases() {
        let store = MemoryStore::new();
        let mut registry = BoostRegistry::load(&store).unwrap();
        assert!(matches!(
            registry.purchase_boost("x", "x", 1, 30, t0()),
            Err(ForgeError::InvalidArgument { field: "multiplier", .. })
        ));
        assert!(matches!(
            registry.purchase_boost("x", "x", 2, 0, t0()),
            Err(ForgeError::InvalidArgument { field: "minutes", .. })
        ));
        assert!(registry.all().is_empty());
    }

    #[test]
    fn corrupt_blob_loads_empty() {
        let store = MemoryStore::new();
        store.set(BOOSTS_KEY, "[{not json").unwrap();
        let registry = BoostRegistry::load(&store).unwrap();
        assert!(registry.all().is_empty());
    }
}
