use crate::db::store::{KeyValueStore, OWNED_ITEMS_KEY};
use crate::engine::progression::ProgressionEngine;
use crate::error::{ForgeError, Result};
use crate::models::{find_item, Boost, ItemEffect, ShopItem};

/// What a purchase delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Purchase {
    Boost(Boost),
    StreakFreeze { freezes: u32 },
    Xp { awarded: u64 },
    Medal,
}

pub struct Shop<'a> {
    store: &'a dyn KeyValueStore,
    owned: Vec<String>,
}

impl<'a> Shop<'a> {
    pub fn load(store: &'a dyn KeyValueStore) -> Result<Self> {
        let owned = match store.get(OWNED_ITEMS_KEY)? {
            None => Vec::new(),
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("Discarding unreadable owned items: {}", e);
                Vec::new()
            }),
        };
        Ok(Self { store, owned })
    }

    pub fn owns(&self, item_id: &str) -> bool {
        self.owned.iter().any(|id| id == item_id)
    }

    pub fn owned(&self) -> &[String] {
        &self.owned
    }

    /// Whether `item` could be bought right now with `coins`.
    pub fn can_afford(&self, item: &ShopItem, coins: u64) -> bool {
        coins >= item.price && !(item.effect == ItemEffect::Medal && self.owns(item.id))
    }

    /// Charges the price, then applies the item's effect. If the effect cannot
    /// be stored the price is refunded.
    pub fn purchase(&mut self, engine: &mut ProgressionEngine<'_>, item_id: &str) -> Result<Purchase> {
        let item = find_item(item_id).ok_or_else(|| ForgeError::UnknownItem(item_id.to_string()))?;

        if item.effect == ItemEffect::Medal && self.owns(item.id) {
            return Err(ForgeError::AlreadyOwned(item.name.to_string()));
        }
        let balance = engine.profile().coins;
        if balance < item.price {
            return Err(ForgeError::InsufficientBalance {
                needed: item.price,
                available: balance,
            });
        }

        let price = i64::try_from(item.price)
            .map_err(|_| ForgeError::invalid("price", "out of range"))?;
        engine.add_coins(-price)?;

        let purchase = match self.apply(engine, item) {
            Ok(purchase) => purchase,
            Err(e) => {
                if let Err(refund) = engine.add_coins(price) {
                    log::error!("Refund of {} coins for {} failed: {}", item.price, item.id, refund);
                }
                return Err(e);
            }
        };

        log::info!("Purchased {} for {} coins", item.id, item.price);
        Ok(purchase)
    }

    fn apply(&mut self, engine: &mut ProgressionEngine<'_>, item: &ShopItem) -> Result<Purchase> {
        Ok(match item.effect {
            ItemEffect::Boost { multiplier, minutes } => {
                Purchase::Boost(engine.purchase_boost(item.id, item.name, multiplier, minutes)?)
            }
            ItemEffect::StreakFreeze => Purchase::StreakFreeze {
                freezes: engine.add_streak_freeze()?,
            },
            ItemEffect::XpPack { xp } => Purchase::Xp {
                awarded: engine.add_xp(xp, false)?,
            },
            ItemEffect::Medal => {
                let mut next = self.owned.clone();
                next.push(item.id.to_string());
                self.commit(next)?;
                Purchase::Medal
            }
        })
    }

    fn commit(&mut self, next: Vec<String>) -> Result<()> {
        let raw = serde_json::to_string(&next)?;
        self.store.set(OWNED_ITEMS_KEY, &raw)?;
        self.owned = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::db::store::MemoryStore;
    use crate::db::store::BOOSTS_KEY;

    /// Rejects writes to one key, everything else goes to memory.
    struct RejectingStore {
        inner: MemoryStore,
        rejected: &'static str,
    }

    impl KeyValueStore for RejectingStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            if key == self.rejected {
                return Err(ForgeError::Store(rusqlite::Error::QueryReturnedNoRows));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.inner.remove(key)
        }
    }

    fn rejecting(key: &'static str) -> RejectingStore {
        RejectingStore {
            inner: MemoryStore::new(),
            rejected: key,
        }
    }

    #[test]
    fn failed_boost_write_refunds_the_price() {
        let store = rejecting(BOOSTS_KEY);
        let clock = FixedClock::at(2026, 3, 10);
        let mut engine = ProgressionEngine::load(&store, &clock).unwrap();
        let mut shop = Shop::load(&store).unwrap();
        engine.add_coins(120).unwrap();

        let err = shop.purchase(&mut engine, "double_xp_30").unwrap_err();
        assert!(matches!(err, ForgeError::Store(_)));
        assert_eq!(engine.profile().coins, 120);
        assert_eq!(engine.active_xp_multiplier(), 1);

        let reloaded = ProgressionEngine::load(&store, &clock).unwrap();
        assert_eq!(reloaded.profile().coins, 120);
    }

    #[test]
    fn failed_medal_write_refunds_the_price() {
        let store = rejecting(OWNED_ITEMS_KEY);
        let clock = FixedClock::at(2026, 3, 10);
        let mut engine = ProgressionEngine::load(&store, &clock).unwrap();
        let mut shop = Shop::load(&store).unwrap();
        engine.add_coins(60).unwrap();

        assert!(shop.purchase(&mut engine, "bronze_medal").is_err());
        assert_eq!(engine.profile().coins, 60);
        assert!(!shop.owns("bronze_medal"));
    }

    #[test]
    fn boost_purchase_charges_and_activates() {
        let store = MemoryStore::new();
        let clock = FixedClock::at(2026, 3, 10);
        let mut engine = ProgressionEngine::load(&store, &clock).unwrap();
        let mut shop = Shop::load(&store).unwrap();
        engine.add_coins(300).unwrap();

        let purchase = shop.purchase(&mut engine, "triple_xp_30").unwrap();
        assert!(matches!(purchase, Purchase::Boost(ref b) if b.multiplier == 3));
        assert_eq!(engine.profile().coins, 50);
        assert_eq!(engine.active_xp_multiplier(), 3);
    }

    #[test]
    fn insufficient_balance_changes_nothing() {
        let store = MemoryStore::new();
        let clock = FixedClock::at(2026, 3, 10);
        let mut engine = ProgressionEngine::load(&store, &clock).unwrap();
        let mut shop = Shop::load(&store).unwrap();
        engine.add_coins(99).unwrap();

        let err = shop.purchase(&mut engine, "double_xp_30").unwrap_err();
        assert!(matches!(
            err,
            ForgeError::InsufficientBalance { needed: 100, available: 99 }
        ));
        assert_eq!(engine.profile().coins, 99);
        assert_eq!(engine.active_xp_multiplier(), 1);
    }

    #[test]
    fn streak_freeze_and_xp_pack() {
        let store = MemoryStore::new();
        let clock = FixedClock::at(2026, 3, 10);
        let mut engine = ProgressionEngine::load(&store, &clock).unwrap();
        let mut shop = Shop::load(&store).unwrap();
        engine.add_coins(500).unwrap();
        engine.purchase_boost("double_xp_30", "2x XP Boost", 2, 30).unwrap();

        assert_eq!(
            shop.purchase(&mut engine, "streak_freeze").unwrap(),
            Purchase::StreakFreeze { freezes: 1 }
        );
        // XP packs bypass active boosts.
        assert_eq!(
            shop.purchase(&mut engine, "xp_pack").unwrap(),
            Purchase::Xp { awarded: 100 }
        );
        assert_eq!(engine.profile().xp, 100);
        assert_eq!(engine.profile().streak_freezes, 1);
        assert_eq!(engine.profile().coins, 500 - 120 - 150);
    }

    #[test]
    fn medals_are_owned_once() {
        let store = MemoryStore::new();
        let clock = FixedClock::at(2026, 3, 10);
        let mut engine = ProgressionEngine::load(&store, &clock).unwrap();
        let mut shop = Shop::load(&store).unwrap();
        engine.add_coins(200).unwrap();

        assert_eq!(shop.purchase(&mut engine, "bronze_medal").unwrap(), Purchase::Medal);
        assert!(shop.owns("bronze_medal"));
        assert!(!shop.can_afford(find_item("bronze_medal").unwrap(), 200));
        assert!(matches!(
            shop.purchase(&mut engine, "bronze_medal"),
            Err(ForgeError::AlreadyOwned(_))
        ));
        assert_eq!(engine.profile().coins, 150);

        let reloaded = Shop::load(&store).unwrap();
        assert_eq!(reloaded.owned(), ["bronze_medal".to_string()]);
    }

    #[test]
    fn unknown_item_is_rejected() {
        let store = MemoryStore::new();
        let clock = FixedClock::at(2026, 3, 10);
        let mut engine = ProgressionEngine::load(&store, &clock).unwrap();
        let mut shop = Shop::load(&store).unwrap();
        assert!(matches!(
            shop.purchase(&mut engine, "rocket"),
            Err(ForgeError::UnknownItem(id)) if id == "rocket"
        ));
    }
}
