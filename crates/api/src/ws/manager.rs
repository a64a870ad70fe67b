//! Registry of live notification sockets, indexed by user.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use hms_core::types::DbId;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Open sockets per user. A user may hold several (one per browser tab).
///
/// Shared behind an `Arc`; notification delivery only ever looks up a
/// single user, so sockets are grouped by user id rather than kept flat.
#[derive(Default)]
pub struct WsManager {
    users: RwLock<HashMap<DbId, HashMap<Uuid, WsSender>>>,
}

impl WsManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register socket `conn_id` for `user_id`.
    ///
    /// Returns the receiver half that the socket's writer task drains.
    pub async fn add(&self, user_id: DbId, conn_id: Uuid) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.users
            .write()
            .await
            .entry(user_id)
            .or_default()
            .insert(conn_id, tx);
        rx
    }

    /// Forget a socket. The user's entry goes with their last socket.
    pub async fn remove(&self, user_id: DbId, conn_id: Uuid) {
        let mut users = self.users.write().await;
        if let Some(sockets) = users.get_mut(&user_id) {
            sockets.remove(&conn_id);
            if sockets.is_empty() {
                users.remove(&user_id);
            }
        }
    }

    /// Push `message` to every socket of `user_id`.
    ///
    /// Returns how many sockets accepted it; zero means the user is offline.
    pub async fn send_to_user(&self, user_id: DbId, message: Message) -> usize {
        let users = self.users.read().await;
        users.get(&user_id).map_or(0, |sockets| {
            sockets
                .values()
                .filter(|tx| tx.send(message.clone()).is_ok())
                .count()
        })
    }

    pub async fn connection_count(&self) -> usize {
        self.users.read().await.values().map(HashMap::len).sum()
    }

    /// Ping every socket and drop those whose writer task has gone away.
    ///
    /// Returns the number of sockets still connected.
    pub async fn ping_all(&self) -> usize {
        let mut users = self.users.write().await;
        users.retain(|_, sockets| {
            sockets.retain(|_, tx| tx.send(Message::Ping(Bytes::new())).is_ok());
            !sockets.is_empty()
        });
        users.values().map(HashMap::len).sum()
    }

    /// Send a Close frame to every socket, then forget them all.
    pub async fn shutdown_all(&self) {
        let mut users = self.users.write().await;
        let mut count = 0;
        for tx in users.values().flat_map(HashMap::values) {
            let _ = tx.send(Message::Close(None));
            count += 1;
        }
        users.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }
}
