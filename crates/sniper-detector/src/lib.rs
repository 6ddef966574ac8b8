//! Signal rule engine for the whale sniper.
//!
//! Rules keep their own running state across snapshots (last seen walls,
//! spread baseline, cooldown clock) and decide when to emit an [`Alert`].
//!
//! [`Alert`]: sniper_core::Alert

pub mod config;
pub mod cooldown;
pub mod engine;
pub mod error;
pub mod rule;
pub mod spread;
pub mod wall;

pub use config::{SpreadConfig, WallConfig};
pub use cooldown::Cooldown;
pub use engine::SignalEngine;
pub use error::{DetectorError, DetectorResult};
pub use rule::SignalRule;
pub use spread::SpreadSpikeRule;
pub use wall::{WallEvent, WallRule};
