//! Multi-sink alert dispatch.

use crate::sink::DynAlertSink;
use sniper_core::Alert;
use std::sync::Arc;
use tracing::debug;

/// Fans each alert out to every registered sink, one sink after another.
///
/// A slow or failing sink delays but never prevents delivery to the sinks
/// after it.
#[derive(Clone, Default)]
pub struct AlertDispatcher {
    sinks: Arc<Vec<DynAlertSink>>,
}

impl AlertDispatcher {
    pub fn new(sinks: Vec<DynAlertSink>) -> Self {
        Self {
            sinks: Arc::new(sinks),
        }
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Deliver `alert` to every sink in registration order.
    pub async fn publish(&self, alert: &Alert) {
        for sink in self.sinks.iter() {
            debug!(sink = sink.name(), title = %alert.title, "Dispatching alert");
            sink.send(alert).await;
        }
    }

    /// Deliver `alert` on a background task without blocking the caller.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn_publish(&self, alert: Alert) -> tokio::task::JoinHandle<()> {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            dispatcher.publish(&alert).await;
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{AlertSink, BoxFuture, DynAlertSink, RecordingSink};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Sink that always "fails" (absorbs the failure) after a delay.
    struct FailingSink {
        attempts: AtomicUsize,
    }

    impl AlertSink for FailingSink {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn send<'a>(&'a self, _alert: &'a Alert) -> BoxFuture<'a, ()> {
            Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                self.attempts.fetch_add(1, Ordering::SeqCst);
            })
        }
    }

    #[tokio::test]
    async fn test_every_sink_attempted() {
        let failing = Arc::new(FailingSink {
            attempts: AtomicUsize::new(0),
        });
        let recording = Arc::new(RecordingSink::new());
        let dispatcher = AlertDispatcher::new(vec![
            failing.clone() as DynAlertSink,
            recording.clone() as DynAlertSink,
        ]);

        dispatcher.publish(&Alert::new("a", "1")).await;
        dispatcher.publish(&Alert::new("b", "2")).await;

        assert_eq!(failing.attempts.load(Ordering::SeqCst), 2);
        let titles: Vec<_> = recording.alerts().into_iter().map(|a| a.title).collect();
        assert_eq!(titles, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_spawn_publish_does_not_block() {
        let recording = Arc::new(RecordingSink::new());
        let dispatcher = AlertDispatcher::new(vec![
            Arc::new(FailingSink {
                attempts: AtomicUsize::new(0),
            }) as DynAlertSink,
            recording.clone() as DynAlertSink,
        ]);

        let handle = dispatcher.spawn_publish(Alert::new("bg", "x"));
        assert!(recording.is_empty());

        handle.await.unwrap();
        assert_eq!(recording.len(), 1);
    }

    #[tokio::test]
    async fn test_no_sinks() {
        let dispatcher = AlertDispatcher::default();
        assert_eq!(dispatcher.sink_count(), 0);
        dispatcher.publish(&Alert::new("t", "m")).await;
    }
}
