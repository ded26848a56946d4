//! Room router
//!
//! Maps room keys to their members (at most two), admits connections,
//! relays opaque messages to the other member, and tears membership down
//! on disconnect. Room mutations happen under the DashMap entry lock so
//! racing joins cannot overfill a room; notifications are sent only after
//! the lock is released.

use crate::connection::Connection;
use crate::protocol::{RoomId, ServerMessage};
use dashmap::DashMap;
use std::sync::Arc;

/// Maximum number of members per room
pub const ROOM_CAPACITY: usize = 2;

/// Members of one room, in admission order
///
/// Index 0 is the first-admitted member, which makes it the designated
/// offer initiator when the room fills.
#[derive(Default)]
struct Room {
    members: Vec<Arc<Connection>>,
}

/// Result of an admission request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Admitted; `count` is the member count including this connection
    Admitted { count: usize },
    /// Room already had two members; nothing changed
    Full,
    /// The connection already belongs to a room; the request was ignored
    AlreadyJoined,
}

/// Routes admission, relay, and teardown for all rooms
pub struct RoomRouter {
    /// Live rooms by key; empty rooms are removed eagerly
    rooms: DashMap<RoomId, Room>,
}

impl RoomRouter {
    /// Create a new router with no rooms
    #[must_use]
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }

    /// Create a new router wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Admit a connection into a room, creating the room lazily
    ///
    /// Replies `joined { count }` to the requester on success and `full`
    /// when the room is at capacity. When the admission fills the room,
    /// the first-admitted member receives `start-offer`; the fixed
    /// first-mover rule prevents both sides initiating at once.
    pub async fn join(&self, conn: &Arc<Connection>, room_id: RoomId) -> JoinOutcome {
        // A connection joins at most one room in its lifetime; repeated
        // joins are ignored without a reply.
        if conn.is_joined().await {
            tracing::debug!(
                connection_id = %conn.id(),
                room = %room_id,
                "Ignoring join from already-joined connection"
            );
            return JoinOutcome::AlreadyJoined;
        }

        // Capacity check and insertion are atomic under the entry lock.
        let admitted = {
            let mut entry = self.rooms.entry(room_id.clone()).or_default();
            let room = entry.value_mut();
            if room.members.len() >= ROOM_CAPACITY {
                None
            } else {
                room.members.push(conn.clone());
                let count = room.members.len();
                let initiator = (count == ROOM_CAPACITY).then(|| room.members[0].clone());
                Some((count, initiator))
            }
        };

        let Some((count, initiator)) = admitted else {
            tracing::info!(
                connection_id = %conn.id(),
                room = %room_id,
                "Room full, admission rejected"
            );
            if conn.send(ServerMessage::Full).await.is_err() {
                tracing::debug!(connection_id = %conn.id(), "Requester gone before full reply");
            }
            return JoinOutcome::Full;
        };

        conn.set_room(room_id.clone()).await;

        tracing::info!(
            connection_id = %conn.id(),
            room = %room_id,
            count = count,
            "Connection admitted to room"
        );

        if conn.send(ServerMessage::Joined { count }).await.is_err() {
            tracing::debug!(connection_id = %conn.id(), "Requester gone before joined reply");
        }

        if let Some(first) = initiator {
            if first.send(ServerMessage::StartOffer).await.is_err() {
                tracing::debug!(
                    connection_id = %first.id(),
                    room = %room_id,
                    "First member gone before start-offer"
                );
            }
        }

        JoinOutcome::Admitted { count }
    }

    /// Relay raw message text to the other member of the sender's room
    ///
    /// The text is forwarded byte-for-byte; the sender is never a target.
    /// Without an assigned room there is no relay context and the message
    /// is dropped.
    pub async fn relay(&self, conn: &Arc<Connection>, raw: &str) {
        let Some(room_id) = conn.room().await else {
            tracing::debug!(
                connection_id = %conn.id(),
                "Dropping relay message from roomless connection"
            );
            return;
        };

        let targets: Vec<Arc<Connection>> = self
            .rooms
            .get(&room_id)
            .map(|room| {
                room.members
                    .iter()
                    .filter(|member| member.id() != conn.id())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        for peer in targets {
            if peer.is_closed() {
                continue;
            }
            // Best-effort: a failed delivery is not retried or surfaced.
            if peer.forward_raw(raw.to_owned()).await.is_err() {
                tracing::debug!(
                    connection_id = %peer.id(),
                    room = %room_id,
                    "Relay target gone, message dropped"
                );
            }
        }
    }

    /// Remove a connection from its room on disconnect
    ///
    /// Remaining members receive `partner-left`; a room with no members
    /// left is deleted so churned keys do not accumulate.
    pub async fn leave(&self, conn: &Arc<Connection>) {
        let Some(room_id) = conn.room().await else {
            return;
        };

        let remaining: Vec<Arc<Connection>> = {
            let Some(mut entry) = self.rooms.get_mut(&room_id) else {
                return;
            };
            let room = entry.value_mut();
            room.members.retain(|member| member.id() != conn.id());
            room.members.clone()
        };

        if remaining.is_empty() {
            // Re-checks emptiness atomically in case a join raced in.
            self.rooms.remove_if(&room_id, |_, room| room.members.is_empty());
            tracing::info!(room = %room_id, "Room emptied and removed");
        } else {
            tracing::info!(
                connection_id = %conn.id(),
                room = %room_id,
                remaining = remaining.len(),
                "Connection left room"
            );
            for peer in remaining {
                if peer.send(ServerMessage::PartnerLeft).await.is_err() {
                    tracing::debug!(
                        connection_id = %peer.id(),
                        room = %room_id,
                        "Remaining member gone before partner-left"
                    );
                }
            }
        }
    }

    /// Number of live rooms
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Member count of a room, if it exists
    pub fn member_count(&self, room_id: &RoomId) -> Option<usize> {
        self.rooms.get(room_id).map(|room| room.members.len())
    }
}

impl Default for RoomRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RoomRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomRouter")
            .field("rooms", &self.rooms.len())
            .finish()
    }
}
