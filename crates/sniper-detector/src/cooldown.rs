//! Per-rule alert cooldown clock.

use chrono::{DateTime, Duration, Utc};

/// Gates alert frequency. Only moves when an alert is actually emitted.
#[derive(Debug, Clone)]
pub struct Cooldown {
    period: Duration,
    last_alert: Option<DateTime<Utc>>,
}

impl Cooldown {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            last_alert: None,
        }
    }

    pub fn from_secs(secs: u64) -> Self {
        let secs = i64::try_from(secs).unwrap_or(i64::MAX).min(i64::MAX / 1000);
        Self::new(Duration::seconds(secs))
    }

    /// True while `now` is within the period after the last alert.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.last_alert
            .is_some_and(|last| now.signed_duration_since(last) < self.period)
    }

    /// Record an emitted alert.
    pub fn trigger(&mut self, now: DateTime<Utc>) {
        self.last_alert = Some(now);
    }

    pub fn last_alert(&self) -> Option<DateTime<Utc>> {
        self.last_alert
    }
}
