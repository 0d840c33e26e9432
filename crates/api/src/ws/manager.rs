use std::collections::HashMap;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::ws::Message;
use roster_core::types::DbId;
use roster_events::delivery::private_channel;
use roster_events::BroadcastSink;
use serde::Serialize;
use tokio::sync::{mpsc, RwLock};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Metadata for a single WebSocket connection.
pub struct WsConnection {
    /// Notifiable this socket listens for; anonymous sockets get no pushes.
    pub user_id: Option<DbId>,
    /// Channel sender for outbound messages to this connection.
    pub sender: WsSender,
}

/// Frame pushed to a notifiable's sockets for every broadcast notification.
#[derive(Debug, Serialize)]
pub struct NotificationFrame<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Private channel name, `users.{id}`.
    pub channel: String,
    pub data: &'a serde_json::Value,
}

/// Manages all active WebSocket connections.
///
/// Thread-safe via interior `RwLock`; wrapped in `Arc` and shared across the
/// application.
pub struct WsManager {
    connections: RwLock<HashMap<String, WsConnection>>,
}

impl WsManager {
    /// Create a new, empty connection manager.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink. Re-using a `conn_id` replaces
    /// the previous connection.
    pub async fn add(
        &self,
        conn_id: String,
        user_id: Option<DbId>,
    ) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            user_id,
            sender: tx,
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    /// Remove a connection by its ID.
    pub async fn remove(&self, conn_id: &str) {
        self.connections.write().await.remove(conn_id);
    }

    /// Send a message to all connections belonging to a specific user.
    ///
    /// Returns the number of connections the message was handed to. Closed
    /// channels are skipped and not counted.
    pub async fn send_to_user(&self, user_id: DbId, message: Message) -> usize {
        let conns = self.connections.read().await;
        let mut count = 0;
        for conn in conns.values() {
            if conn.user_id == Some(user_id) && conn.sender.send(message.clone()).is_ok() {
                count += 1;
            }
        }
        count
    }

    /// Return the current number of active connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Send a Close frame to every connection, then clear the map.
    ///
    /// Used during graceful shutdown.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every connected client.
    pub async fn ping_all(&self) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BroadcastSink for WsManager {
    async fn push(&self, notifiable_id: DbId, payload: serde_json::Value) -> usize {
        let frame = NotificationFrame {
            kind: "notification",
            channel: private_channel(notifiable_id),
            data: &payload,
        };

        let text = match serde_json::to_string(&frame) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(notifiable_id, error = %e, "Failed to encode notification frame");
                return 0;
            }
        };

        self.send_to_user(notifiable_id, Message::Text(text.into()))
            .await
    }
}
