pub mod boosts;
pub mod header;
pub mod profile;
pub mod shop;
pub mod statusbar;
pub mod streak;
pub mod timer;
