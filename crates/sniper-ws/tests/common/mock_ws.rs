//! Mock exchange WebSocket server for integration tests.
//!
//! Can:
//! - Accept connections and count them
//! - Record every text message with the connection it arrived on
//! - Push binary frames to all live connections
//! - Drop all live connections to force a reconnect

use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// Command pushed to every live connection.
#[derive(Debug, Clone)]
enum Command {
    Binary(Vec<u8>),
    Drop,
}

/// A mock WebSocket server for testing.
pub struct MockWsServer {
    addr: SocketAddr,
    shutdown_tx: mpsc::Sender<()>,
    commands: broadcast::Sender<Command>,
    messages: Arc<Mutex<Vec<(u32, String)>>>,
    connections: Arc<Mutex<u32>>,
}

impl MockWsServer {
    /// Start a new mock WebSocket server on an available port.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let messages: Arc<Mutex<Vec<(u32, String)>>> = Arc::new(Mutex::new(Vec::new()));
        let connections: Arc<Mutex<u32>> = Arc::new(Mutex::new(0));
        let (commands, _) = broadcast::channel::<Command>(64);
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let messages_clone = messages.clone();
        let connections_clone = connections.clone();
        let commands_clone = commands.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    Ok((stream, _)) = listener.accept() => {
                        let conn_id = {
                            let mut count = connections_clone.lock().await;
                            *count += 1;
                            *count
                        };
                        // Subscribe before the handshake so no command is missed.
                        let command_rx = commands_clone.subscribe();
                        tokio::spawn(handle_connection(
                            stream,
                            conn_id,
                            messages_clone.clone(),
                            command_rx,
                        ));
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }
        });

        Self {
            addr,
            shutdown_tx,
            commands,
            messages,
            connections,
        }
    }

    /// Get the server's WebSocket URL.
    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Get the number of connections accepted.
    pub async fn connection_count(&self) -> u32 {
        *self.connections.lock().await
    }

    /// Text messages received on connection `conn_id` (1-based).
    pub async fn messages_on(&self, conn_id: u32) -> Vec<String> {
        self.messages
            .lock()
            .await
            .iter()
            .filter(|(id, _)| *id == conn_id)
            .map(|(_, text)| text.clone())
            .collect()
    }

    /// Push a binary frame to every live connection.
    pub fn push_binary(&self, data: Vec<u8>) {
        let _ = self.commands.send(Command::Binary(data));
    }

    /// Close every live connection without a close handshake.
    pub fn drop_connections(&self) {
        let _ = self.commands.send(Command::Drop);
    }

    /// Shutdown the server.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

async fn handle_connection(
    stream: TcpStream,
    conn_id: u32,
    messages: Arc<Mutex<Vec<(u32, String)>>>,
    mut commands: broadcast::Receiver<Command>,
) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            eprintln!("WebSocket handshake failed: {}", e);
            return;
        }
    };

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    messages.lock().await.push((conn_id, text.clone()));
                    let ack = serde_json::json!({"id": 0, "code": 0, "msg": text});
                    let _ = write.send(Message::Text(ack.to_string())).await;
                }
                Some(Ok(Message::Ping(data))) => {
                    let _ = write.send(Message::Pong(data)).await;
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
            command = commands.recv() => match command {
                Ok(Command::Binary(data)) => {
                    let _ = write.send(Message::Binary(data)).await;
                }
                Ok(Command::Drop) | Err(_) => break,
            },
        }
    }
}
