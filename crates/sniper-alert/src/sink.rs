//! Alert sink trait.

use parking_lot::Mutex;
use sniper_core::Alert;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Destination for alerts.
///
/// `send` never fails the caller: delivery errors are logged (and counted)
/// inside the sink.
pub trait AlertSink: Send + Sync {
    /// Sink name for logs and metrics.
    fn name(&self) -> &'static str;

    /// Deliver one alert.
    fn send<'a>(&'a self, alert: &'a Alert) -> BoxFuture<'a, ()>;
}

/// Arc wrapper for AlertSink trait objects.
pub type DynAlertSink = Arc<dyn AlertSink>;

/// Sink that records every alert, for tests and dry runs.
#[derive(Debug, Default)]
pub struct RecordingSink {
    alerts: Mutex<Vec<Alert>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Alerts received so far, in delivery order.
    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.alerts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.lock().is_empty()
    }
}

impl AlertSink for RecordingSink {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn send<'a>(&'a self, alert: &'a Alert) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            self.alerts.lock().push(alert.clone());
        })
    }
}
