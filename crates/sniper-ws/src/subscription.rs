//! Subscription tracking and replay.
//!
//! The exchange forgets subscriptions when a socket session ends, so every
//! topic ever requested is remembered here and re-issued, in the order it
//! was first added, each time the connection comes back.

use crate::message::{DepthTopic, SubscriptionRequest};
use crate::ws_write_handle::WsWriteHandle;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

/// Subscription tracker.
///
/// Topics are unique and only ever added. Mutation and replay snapshots
/// are serialized by the internal lock, so concurrent `subscribe` calls and
/// a reconnect-triggered `replay` can neither lose nor duplicate topics.
pub struct SubscriptionTracker {
    /// Active topics in first-subscribed order.
    topics: RwLock<Vec<DepthTopic>>,
    writer: WsWriteHandle,
}

impl SubscriptionTracker {
    /// Create a tracker that sends through `writer`.
    pub fn new(writer: WsWriteHandle) -> Self {
        Self {
            topics: RwLock::new(Vec::new()),
            writer,
        }
    }

    /// Subscribe to the limit-depth stream of `symbol` at `depth`.
    ///
    /// Records the topic (a repeat is a no-op beyond resending) and sends
    /// the request right away if connected. Returns true if the topic was
    /// newly added.
    pub fn subscribe(&self, symbol: &str, depth: u32) -> bool {
        let topic = DepthTopic::new(symbol, depth);

        let added = {
            let mut topics = self.topics.write();
            if topics.contains(&topic) {
                false
            } else {
                topics.push(topic.clone());
                true
            }
        };

        let sent = self.send_subscribe(&topic);
        info!(%symbol, depth, added, sent, "Subscribed to depth stream");
        added
    }

    /// Re-issue a subscribe request for every tracked topic.
    ///
    /// Called by the connection after each successful handshake. Failed
    /// sends are not retried here; the next reconnect replays the full set.
    /// Returns the number of requests queued.
    pub fn replay(&self) -> usize {
        let topics = self.topics();
        if topics.is_empty() {
            debug!("No subscriptions to replay");
            return 0;
        }

        info!(count = topics.len(), "Resubscribing after reconnect");
        topics
            .iter()
            .filter(|topic| self.send_subscribe(topic))
            .count()
    }

    /// Snapshot of tracked topics in insertion order.
    pub fn topics(&self) -> Vec<DepthTopic> {
        self.topics.read().clone()
    }

    pub fn len(&self) -> usize {
        self.topics.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.read().is_empty()
    }

    fn send_subscribe(&self, topic: &DepthTopic) -> bool {
        match SubscriptionRequest::subscribe(topic).to_json() {
            Ok(json) => self.writer.send_text(json),
            Err(e) => {
                warn!(?e, %topic, "Failed to encode subscription request");
                false
            }
        }
    }
}
