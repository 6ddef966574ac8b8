//! Alert type handed from signal rules to alert sinks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    /// Create an alert stamped with the current time.
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::at(title, message, Utc::now())
    }

    /// Create an alert with an explicit timestamp.
    pub fn at(title: impl Into<String>, message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            timestamp,
        }
    }
}
