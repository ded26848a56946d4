//! Individual WebSocket connection
//!
//! An opaque handle to one client's bidirectional channel. Owns the outbound
//! queue feeding the connection's writer task and remembers which room the
//! connection joined, if any.

use crate::protocol::{Outbound, RoomId, ServerMessage};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, RwLock};

/// A single WebSocket connection
pub struct Connection {
    /// Unique connection ID
    id: String,

    /// Room this connection was admitted to (None until a successful join)
    ///
    /// Set at most once for the lifetime of the connection.
    room: RwLock<Option<RoomId>>,

    /// Channel to the writer task draining frames onto the WebSocket
    sender: mpsc::Sender<Outbound>,

    /// Connection creation time
    created_at: Instant,
}

impl Connection {
    /// Create a new connection handle
    pub fn new(id: String, sender: mpsc::Sender<Outbound>) -> Arc<Self> {
        Arc::new(Self {
            id,
            room: RwLock::new(None),
            sender,
            created_at: Instant::now(),
        })
    }

    /// Generate a unique connection ID
    #[must_use]
    pub fn generate_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Get the connection ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the room this connection belongs to, if any
    pub async fn room(&self) -> Option<RoomId> {
        self.room.read().await.clone()
    }

    /// Check whether this connection has been admitted to a room
    pub async fn is_joined(&self) -> bool {
        self.room.read().await.is_some()
    }

    /// Record the room assignment
    ///
    /// The first write wins; returns false (and changes nothing) if a room
    /// was already assigned.
    pub async fn set_room(&self, room_id: RoomId) -> bool {
        let mut room = self.room.write().await;
        if room.is_some() {
            return false;
        }
        *room = Some(room_id);
        true
    }

    /// Queue a server event for this connection
    pub async fn send(
        &self,
        message: ServerMessage,
    ) -> Result<(), mpsc::error::SendError<Outbound>> {
        self.sender.send(Outbound::Event(message)).await
    }

    /// Queue verbatim relayed text for this connection
    pub async fn forward_raw(&self, text: String) -> Result<(), mpsc::error::SendError<Outbound>> {
        self.sender.send(Outbound::Relay(text)).await
    }

    /// Check if the outbound channel is closed (writer task gone)
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Get connection age
    pub fn age(&self) -> std::time::Duration {
        self.created_at.elapsed()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .finish()
    }
}
