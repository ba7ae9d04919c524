use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemEffect {
    /// Timed XP multiplier.
    Boost { multiplier: u32, minutes: u32 },
    /// One streak freeze token.
    StreakFreeze,
    /// Converts coins into unboosted XP.
    XpPack { xp: u64 },
    /// Cosmetic, owned at most once.
    Medal,
}

impl ItemEffect {
    pub fn category(&self) -> ItemCategory {
        match self {
            ItemEffect::Boost { .. } => ItemCategory::Boost,
            ItemEffect::StreakFreeze | ItemEffect::XpPack { .. } => ItemCategory::Utility,
            ItemEffect::Medal => ItemCategory::Cosmetic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemCategory {
    Boost,
    Utility,
    Cosmetic,
}

impl ItemCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            ItemCategory::Boost => "XP Boosts",
            ItemCategory::Utility => "Utilities",
            ItemCategory::Cosmetic => "Medals & Achievements",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShopItem {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub price: u64,
    pub effect: ItemEffect,
}

impl fmt::Display for ShopItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

pub const CATALOG: &[ShopItem] = &[
    ShopItem {
        id: "double_xp_30",
        name: "2x XP Boost",
        description: "30 minutes of double XP earnings",
        price: 100,
        effect: ItemEffect::Boost { multiplier: 2, minutes: 30 },
    },
    ShopItem {
        id: "double_xp_60",
        name: "2x XP Boost",
        description: "60 minutes of double XP earnings",
        price: 180,
        effect: ItemEffect::Boost { multiplier: 2, minutes: 60 },
    },
    ShopItem {
        id: "triple_xp_30",
        name: "3x XP Boost",
        description: "30 minutes of triple XP earnings",
        price: 250,
        effect: ItemEffect::Boost { multiplier: 3, minutes: 30 },
    },
    ShopItem {
        id: "streak_freeze",
        name: "Streak Freeze",
        description: "Forgives one missed day without breaking your streak",
        price: 120,
        effect: ItemEffect::StreakFreeze,
    },
    ShopItem {
        id: "xp_pack",
        name: "XP Pack",
        description: "Trade coins for 100 XP (boosts do not apply)",
        price: 150,
        effect: ItemEffect::XpPack { xp: 100 },
    },
    ShopItem {
        id: "bronze_medal",
        name: "Bronze Medal",
        description: "A badge of honor for your dedication",
        price: 50,
        effect: ItemEffect::Medal,
    },
    ShopItem {
        id: "silver_medal",
        name: "Silver Medal",
        description: "A prestigious achievement medal",
        price: 150,
        effect: ItemEffect::Medal,
    },
    ShopItem {
        id: "gold_medal",
        name: "Gold Medal",
        description: "The ultimate symbol of excellence",
        price: 300,
        effect: ItemEffect::Medal,
    },
];

pub fn find_item(id: &str) -> Option<&'static ShopItem> {
    let id = id.trim().to_lowercase();
    CATALOG.iter().find(|item| item.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_ids_are_unique() {
        let ids: HashSet<_> = CATALOG.iter().map(|i| i.id).collect();
        assert_eq!(ids.len(), CATALOG.len());
    }

    #[test]
    fn boosts_multiply_by_more_than_one() {
        for item in CATALOG {
            if let ItemEffect::Boost { multiplier, minutes } = item.effect {
                assert!(multiplier > 1, "{}", item.id);
                assert!(minutes > 0, "{}", item.id);
            }
        }
    }

    #[test]
    fn find_item_ignores_case_and_whitespace() {
        assert_eq!(find_item(" Gold_Medal ").map(|i| i.price), Some(300));
        assert!(find_item("platinum_medal").is_none());
    }
}
