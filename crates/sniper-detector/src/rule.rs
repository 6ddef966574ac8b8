//! Signal rule trait.

use chrono::{DateTime, Utc};
use sniper_core::{Alert, Snapshot};

/// A stateful rule evaluated against every snapshot, in order.
///
/// Evaluation never fails: missing data (an empty side, a crossed book)
/// simply produces no alert.
pub trait SignalRule: Send {
    /// Short identifier used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Evaluate one snapshot observed at `now`.
    fn evaluate(&mut self, snapshot: &Snapshot, now: DateTime<Utc>) -> Option<Alert>;
}
