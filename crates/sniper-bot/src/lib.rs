//! Whale sniper.
//!
//! Wires the pipeline together:
//! - Market-data connection with subscription replay
//! - Protobuf depth decoding into the current order book
//! - Wall and spread-spike rules
//! - Fire-and-forget alert delivery (Telegram)
//! - Optional console order-book view

pub mod app;
pub mod config;
pub mod env_file;
pub mod error;
pub mod render;

pub use app::{Application, Pipeline};
pub use config::{AppConfig, Secrets};
pub use error::{AppError, AppResult};
