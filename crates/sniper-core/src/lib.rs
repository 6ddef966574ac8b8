//! Core domain types for the whale-sniper order-book monitor.
//!
//! This crate provides the values shared by every stage of the pipeline:
//! - `Price`, `Size`: Precision-safe numeric types
//! - `PriceLevel`, `Snapshot`: Replace-style top-of-book views
//! - `Alert`: Immutable notification produced by signal rules

pub mod alert;
pub mod decimal;
pub mod error;
pub mod types;

pub use alert::Alert;
pub use decimal::{Price, Size};
pub use error::{CoreError, Result};
pub use types::{BookSide, PriceLevel, Snapshot};
