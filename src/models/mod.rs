pub mod boost;
pub mod profile;
pub mod session;
pub mod shop;

pub use boost::Boost;
pub use profile::{Profile, StoredProfile};
pub use session::{DailyFocus, SessionRecord, WeeklyGrid};
pub use shop::{find_item, ItemCategory, ItemEffect, ShopItem, CATALOG};
