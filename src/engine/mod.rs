pub mod boosts;
pub mod distraction;
pub mod progression;
pub mod shop;
pub mod timer;

pub use boosts::BoostRegistry;
pub use distraction::DistractionTracker;
pub use progression::{ProgressionEngine, SessionReward};
pub use shop::{Purchase, Shop};
pub use timer::{SessionKind, SessionTimer, TimerEvent, TimerPhase};
