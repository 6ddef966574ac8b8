//! Prometheus metrics and structured logging for the whale sniper.
//!
//! - Structured logging with tracing (JSON in production, pretty otherwise)
//! - Prometheus counters for the feed, rule engine and alert sinks

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;
