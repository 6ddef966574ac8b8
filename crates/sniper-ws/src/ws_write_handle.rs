//! WebSocket write handle for best-effort sends.
//!
//! The live socket is represented by the outbound queue of the current
//! session. The queue sender sits in a `SocketSlot` guarded by a single
//! mutex; the slot lock is only held to install, clear or clone the sender,
//! and the actual network write happens on the run-loop task.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;

/// Outbound queue of a single socket session.
#[derive(Debug)]
struct LiveSocket {
    session: u64,
    outbound: mpsc::UnboundedSender<Message>,
}

/// Guarded handle to the live socket, shared by the run-loop and writers.
#[derive(Debug, Default)]
pub(crate) struct SocketSlot {
    live: Mutex<Option<LiveSocket>>,
}

impl SocketSlot {
    /// Install the outbound queue of a freshly connected session.
    pub(crate) fn install(&self, session: u64, outbound: mpsc::UnboundedSender<Message>) {
        *self.live.lock() = Some(LiveSocket { session, outbound });
    }

    /// Release the socket. Returns the session that was live, if any.
    pub(crate) fn release(&self) -> Option<u64> {
        self.live.lock().take().map(|live| live.session)
    }

    /// Clone the sender of the open session, if any.
    fn open_sender(&self) -> Option<(u64, mpsc::UnboundedSender<Message>)> {
        self.live
            .lock()
            .as_ref()
            .filter(|live| !live.outbound.is_closed())
            .map(|live| (live.session, live.outbound.clone()))
    }

    pub(crate) fn is_open(&self) -> bool {
        self.open_sender().is_some()
    }
}

/// Write handle for sending messages to the WebSocket.
///
/// Cloneable and reconnect-safe: every send targets whichever session is
/// live at the time of the call. When no session is open the message is
/// dropped; the caller is never blocked or handed an error.
#[derive(Debug, Clone)]
pub struct WsWriteHandle {
    slot: Arc<SocketSlot>,
}

impl WsWriteHandle {
    pub(crate) fn new(slot: Arc<SocketSlot>) -> Self {
        Self { slot }
    }

    /// Queue a text message on the live session.
    ///
    /// Returns whether the message was queued.
    pub fn send_text(&self, text: String) -> bool {
        let Some((session, outbound)) = self.slot.open_sender() else {
            debug!("Not connected, dropping outbound message");
            return false;
        };

        if outbound.send(Message::Text(text)).is_err() {
            debug!(session, "Session closed while sending, message dropped");
            return false;
        }
        true
    }

    /// Check whether a session is currently open.
    pub fn is_connected(&self) -> bool {
        self.slot.is_open()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_without_session_is_dropped() {
        let handle = WsWriteHandle::new(Arc::new(SocketSlot::default()));
        assert!(!handle.is_connected());
        assert!(!handle.send_text("hello".to_string()));
    }

    #[test]
    fn test_send_reaches_installed_session() {
        let slot = Arc::new(SocketSlot::default());
        let handle = WsWriteHandle::new(slot.clone());
        let (tx, mut rx) = mpsc::unbounded_channel();
        slot.install(1, tx);

        assert!(handle.send_text("first".to_string()));
        assert_eq!(rx.try_recv().unwrap(), Message::Text("first".to_string()));

        assert_eq!(slot.release(), Some(1));
        assert!(!handle.send_text("second".to_string()));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_queue_counts_as_not_open() {
        let slot = Arc::new(SocketSlot::default());
        let handle = WsWriteHandle::new(slot.clone());
        let (tx, rx) = mpsc::unbounded_channel();
        slot.install(3, tx);
        drop(rx);

        assert!(!handle.is_connected());
        assert!(!handle.send_text("late".to_string()));
    }
}
