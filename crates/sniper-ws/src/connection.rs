//! Market-data connection manager.
//!
//! Owns the socket lifecycle: a single background run-loop connects,
//! replays subscriptions, receives frames, and after any failure or close
//! waits a fixed delay before trying again, until shutdown is requested.
//!
//! State machine:
//! `Disconnected -> Connecting -> Connected -> Disconnected -> ...`,
//! with `Closing` entered from any state by `shutdown()`.

use crate::error::{WsError, WsResult};
use crate::message::ControlReply;
use crate::subscription::SubscriptionTracker;
use crate::ws_write_handle::{SocketSlot, WsWriteHandle};
use futures_util::{SinkExt, StreamExt};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async_tls_with_config, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Connection configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// WebSocket URL.
    pub url: String,
    /// Fixed delay between a disconnect and the next connect attempt.
    pub reconnect_delay_ms: u64,
    /// Client ping interval while connected.
    pub keepalive_interval_ms: u64,
    /// Upper bound on a single connect + handshake.
    pub connect_timeout_ms: u64,
    /// How long `shutdown()` waits for the run-loop to exit.
    pub shutdown_timeout_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: "wss://wbs-api.mexc.com/ws".to_string(),
            reconnect_delay_ms: 3000,
            keepalive_interval_ms: 15000,
            connect_timeout_ms: 10000,
            shutdown_timeout_ms: 2000,
        }
    }
}

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Closing,
}

/// Notification delivered to the pipeline, in receipt order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// Handshake completed and subscriptions were replayed.
    /// Always precedes the frames of the same session.
    Connected { session: u64 },
    /// One complete binary message.
    Frame(Vec<u8>),
    /// The session ended; a reconnect follows unless shutting down.
    Disconnected { session: u64 },
}

/// How a socket session ended without a transport error.
enum SessionEnd {
    Shutdown,
    StreamEnded,
}

/// State shared between the handle and the run-loop task.
struct Shared {
    config: ConnectionConfig,
    state: RwLock<ConnectionState>,
    socket: Arc<SocketSlot>,
    subscriptions: Arc<SubscriptionTracker>,
    event_tx: mpsc::Sender<ConnectionEvent>,
    shutdown_token: CancellationToken,
    sessions: AtomicU64,
    reconnects: AtomicU64,
}

/// Market-data WebSocket connection.
pub struct MarketDataConnection {
    shared: Arc<Shared>,
    runner: Mutex<Option<JoinHandle<()>>>,
}

impl MarketDataConnection {
    /// Create a new connection. Events are delivered on `event_tx`.
    pub fn new(config: ConnectionConfig, event_tx: mpsc::Sender<ConnectionEvent>) -> Self {
        let socket = Arc::new(SocketSlot::default());
        let subscriptions = Arc::new(SubscriptionTracker::new(WsWriteHandle::new(
            socket.clone(),
        )));

        Self {
            shared: Arc::new(Shared {
                config,
                state: RwLock::new(ConnectionState::Disconnected),
                socket,
                subscriptions,
                event_tx,
                shutdown_token: CancellationToken::new(),
                sessions: AtomicU64::new(0),
                reconnects: AtomicU64::new(0),
            }),
            runner: Mutex::new(None),
        }
    }

    /// Subscription tracker bound to this connection.
    pub fn subscriptions(&self) -> Arc<SubscriptionTracker> {
        self.shared.subscriptions.clone()
    }

    /// Get a write handle for best-effort sends.
    pub fn write_handle(&self) -> WsWriteHandle {
        WsWriteHandle::new(self.shared.socket.clone())
    }

    /// Get current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.shared.state.read()
    }

    /// Number of reconnect attempts made so far.
    pub fn reconnect_count(&self) -> u64 {
        self.shared.reconnects.load(Ordering::Relaxed)
    }

    /// Check if shutdown has been requested.
    pub fn is_shutdown(&self) -> bool {
        self.shared.shutdown_token.is_cancelled()
    }

    /// Start the background run-loop.
    ///
    /// Idempotent: returns false if the loop was already started.
    /// Must be called from within a Tokio runtime.
    pub fn connect(&self) -> bool {
        let mut runner = self.runner.lock();
        if runner.is_some() {
            return false;
        }

        let shared = self.shared.clone();
        *runner = Some(tokio::spawn(shared.run()));
        true
    }

    /// Send a text payload on the live session.
    ///
    /// Dropped silently when not connected. Returns whether it was queued.
    pub fn send(&self, payload: String) -> bool {
        self.write_handle().send_text(payload)
    }

    /// Request shutdown and wait (bounded) for the run-loop to exit.
    ///
    /// The loop observes cancellation while connecting, receiving and
    /// sleeping between attempts. If it does not exit within the shutdown
    /// timeout it is aborted. The socket is released either way.
    pub async fn shutdown(&self) {
        info!("Connection shutdown requested");
        self.shared.set_state(ConnectionState::Closing);
        self.shared.shutdown_token.cancel();

        let handle = self.runner.lock().take();
        if let Some(mut handle) = handle {
            let timeout = Duration::from_millis(self.shared.config.shutdown_timeout_ms);
            match tokio::time::timeout(timeout, &mut handle).await {
                Ok(Ok(())) => debug!("Run-loop exited"),
                Ok(Err(e)) => warn!(?e, "Run-loop task failed"),
                Err(_) => {
                    warn!(
                        timeout_ms = timeout.as_millis(),
                        "Run-loop did not exit in time, aborting"
                    );
                    handle.abort();
                }
            }
        }

        self.shared.socket.release();
        self.shared.set_state(ConnectionState::Disconnected);
        info!("Connection closed");
    }
}

impl Shared {
    fn set_state(&self, next: ConnectionState) {
        let mut state = self.state.write();
        if *state != next {
            debug!(from = ?*state, to = ?next, "Connection state change");
            *state = next;
        }
    }

    /// Enter `next` unless shutdown has already moved us to `Closing`.
    fn advance(&self, next: ConnectionState) {
        if !self.shutdown_token.is_cancelled() {
            self.set_state(next);
        }
    }

    async fn run(self: Arc<Self>) {
        let delay = Duration::from_millis(self.config.reconnect_delay_ms);

        loop {
            if self.shutdown_token.is_cancelled() {
                break;
            }

            self.advance(ConnectionState::Connecting);

            match self.run_session().await {
                Ok(SessionEnd::Shutdown) => break,
                Ok(SessionEnd::StreamEnded) => warn!("WebSocket stream ended"),
                Err(e) => error!(?e, "WebSocket error"),
            }

            self.advance(ConnectionState::Disconnected);

            if self.shutdown_token.is_cancelled() {
                break;
            }

            info!(delay_ms = delay.as_millis(), "Disconnected, reconnecting after delay");

            tokio::select! {
                () = self.shutdown_token.cancelled() => {
                    info!("Shutdown requested during reconnect delay, exiting");
                    break;
                }
                () = tokio::time::sleep(delay) => {}
            }

            self.reconnects.fetch_add(1, Ordering::Relaxed);
        }

        info!("Connection run-loop exited");
    }

    /// Connect, replay subscriptions and receive until the session ends.
    ///
    /// The socket slot is always released before returning.
    async fn run_session(&self) -> WsResult<SessionEnd> {
        info!(url = %self.config.url, "Connecting to WebSocket");

        let connect_timeout = Duration::from_millis(self.config.connect_timeout_ms);
        let connect = tokio::time::timeout(
            connect_timeout,
            connect_async_tls_with_config(&self.config.url, None, true, None),
        );

        let ws_stream = tokio::select! {
            biased;
            () = self.shutdown_token.cancelled() => return Ok(SessionEnd::Shutdown),
            result = connect => match result {
                Ok(Ok((stream, _response))) => stream,
                Ok(Err(e)) => return Err(e.into()),
                Err(_) => return Err(WsError::ConnectTimeout(connect_timeout)),
            },
        };

        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
        let session = self.sessions.fetch_add(1, Ordering::Relaxed) + 1;
        self.socket.install(session, outbound_tx);
        self.advance(ConnectionState::Connected);
        info!(session, "WebSocket connected");

        // Queued ahead of any frame this session can deliver.
        self.subscriptions.replay();
        self.emit(ConnectionEvent::Connected { session }).await;

        let result = self.receive_loop(session, ws_stream, &mut outbound_rx).await;

        self.socket.release();
        self.emit(ConnectionEvent::Disconnected { session }).await;
        result
    }

    async fn receive_loop(
        &self,
        session: u64,
        ws_stream: tokio_tungstenite::WebSocketStream<
            tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
        >,
        outbound_rx: &mut mpsc::UnboundedReceiver<Message>,
    ) -> WsResult<SessionEnd> {
        let (mut write, mut read) = ws_stream.split();

        let keepalive_period = Duration::from_millis(self.config.keepalive_interval_ms);
        let mut keepalive = tokio::time::interval_at(
            tokio::time::Instant::now() + keepalive_period,
            keepalive_period,
        );

        loop {
            tokio::select! {
                biased;

                () = self.shutdown_token.cancelled() => {
                    info!(session, "Shutdown signal received in receive loop");
                    let close = tokio::time::timeout(
                        Duration::from_millis(500),
                        write.send(Message::Close(None)),
                    );
                    if !matches!(close.await, Ok(Ok(()))) {
                        debug!(session, "Close frame not sent during shutdown");
                    }
                    return Ok(SessionEnd::Shutdown);
                }

                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Binary(data))) => {
                            self.emit(ConnectionEvent::Frame(data)).await;
                        }
                        Some(Ok(Message::Text(text))) => {
                            handle_control_reply(session, &text);
                        }
                        Some(Ok(Message::Ping(data))) => {
                            debug!(session, "Received ping, sending pong");
                            write.send(Message::Pong(data)).await?;
                        }
                        Some(Ok(Message::Pong(_))) => {
                            debug!(session, "Received pong");
                        }
                        Some(Ok(Message::Close(frame))) => {
                            let (code, reason): (u16, String) = frame
                                .map(|f| (f.code.into(), f.reason.to_string()))
                                .unwrap_or((1000, "Normal close".to_string()));
                            warn!(session, code, %reason, "WebSocket closed by server");
                            return Err(WsError::ConnectionClosed { code, reason });
                        }
                        Some(Ok(Message::Frame(_))) => {}
                        Some(Err(e)) => return Err(e.into()),
                        None => return Ok(SessionEnd::StreamEnded),
                    }
                }

                Some(outbound) = outbound_rx.recv() => {
                    write.send(outbound).await?;
                }

                _ = keepalive.tick() => {
                    write.send(Message::Ping(Vec::new())).await?;
                    debug!(session, "Sent keepalive ping");
                }
            }
        }
    }

    /// Deliver an event upward, giving up if shutdown is requested while
    /// the consumer is applying backpressure.
    async fn emit(&self, event: ConnectionEvent) {
        tokio::select! {
            biased;
            () = self.shutdown_token.cancelled() => {}
            result = self.event_tx.send(event) => {
                if result.is_err() {
                    warn!("Connection event receiver dropped");
                }
            }
        }
    }
}

/// Log a text reply; text frames are never delivered as data.
fn handle_control_reply(session: u64, text: &str) {
    match serde_json::from_str::<ControlReply>(text) {
        Ok(reply) if reply.is_success() => {
            debug!(session, msg = ?reply.msg, "Control reply");
        }
        Ok(reply) => {
            warn!(session, code = ?reply.code, msg = ?reply.msg, "Exchange rejected request");
        }
        Err(_) => {
            debug!(session, %text, "Ignoring unrecognized text message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConnectionConfig::default();
        assert_eq!(config.reconnect_delay_ms, 3000);
        assert_eq!(config.keepalive_interval_ms, 15000);
        assert!(config.url.starts_with("wss://"));
    }

    #[tokio::test]
    async fn test_connect_is_idempotent() {
        let (tx, _rx) = mpsc::channel(8);
        let connection = MarketDataConnection::new(
            ConnectionConfig {
                url: "ws://127.0.0.1:9".to_string(),
                reconnect_delay_ms: 60_000,
                ..Default::default()
            },
            tx,
        );

        assert!(connection.connect());
        assert!(!connection.connect());

        connection.shutdown().await;
        assert_eq!(connection.state(), ConnectionState::Disconnected);
        assert!(connection.is_shutdown());
    }

    #[tokio::test]
    async fn test_send_while_disconnected_is_dropped() {
        let (tx, _rx) = mpsc::channel(8);
        let connection = MarketDataConnection::new(ConnectionConfig::default(), tx);
        assert_eq!(connection.state(), ConnectionState::Disconnected);
        assert!(!connection.send("{}".to_string()));
    }
}
