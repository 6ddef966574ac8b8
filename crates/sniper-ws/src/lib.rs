//! Market-data WebSocket client.
//!
//! Provides a resilient exchange connection with:
//! - A background run-loop (connect, receive, reconnect after a fixed delay)
//! - Cooperative shutdown that interrupts connect, receive and retry delay
//! - Best-effort sends that never block or fail the caller
//! - Subscription tracking with replay on every fresh session

pub mod connection;
pub mod error;
pub mod message;
pub mod subscription;
pub mod ws_write_handle;

pub use connection::{ConnectionConfig, ConnectionEvent, ConnectionState, MarketDataConnection};
pub use error::{WsError, WsResult};
pub use message::{ControlReply, DepthTopic, SubscriptionRequest, LIMIT_DEPTH_CHANNEL};
pub use subscription::SubscriptionTracker;
pub use ws_write_handle::WsWriteHandle;

use std::sync::Once;

static INIT_CRYPTO: Once = Once::new();

/// Initialize the TLS crypto provider.
/// Must be called before any WebSocket or HTTPS connections are made.
pub fn init_crypto() {
    INIT_CRYPTO.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}
