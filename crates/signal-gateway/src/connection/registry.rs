//! Connection registry
//!
//! Tracks all live connections using DashMap for thread-safe access. The
//! registry is pure bookkeeping: an unknown connection is an absent state,
//! not an error.

use super::Connection;
use crate::protocol::Outbound;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Registry of all live WebSocket connections
pub struct ConnectionRegistry {
    /// Active connections by connection ID
    connections: DashMap<String, Arc<Connection>>,
}

impl ConnectionRegistry {
    /// Create a new registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Create a new registry wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a newly accepted connection
    ///
    /// The room association starts absent and is recorded later by the
    /// room router on a successful join.
    pub fn register(&self, sender: mpsc::Sender<Outbound>) -> Arc<Connection> {
        let id = Connection::generate_id();
        let connection = Connection::new(id.clone(), sender);
        self.connections.insert(id.clone(), connection.clone());

        tracing::debug!(connection_id = %id, "Connection registered");

        connection
    }

    /// Remove a connection from the registry
    ///
    /// Safe to call for a connection that never joined a room or was
    /// already removed.
    pub fn unregister(&self, connection_id: &str) -> Option<Arc<Connection>> {
        let removed = self.connections.remove(connection_id).map(|(_, c)| c);
        if removed.is_some() {
            tracing::debug!(connection_id = %connection_id, "Connection unregistered");
        }
        removed
    }

    /// Get a connection by ID
    pub fn get(&self, connection_id: &str) -> Option<Arc<Connection>> {
        self.connections.get(connection_id).map(|r| r.clone())
    }

    /// Check if a connection is registered
    pub fn contains(&self, connection_id: &str) -> bool {
        self.connections.contains_key(connection_id)
    }

    /// Get the total number of live connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("connections", &self.connections.len())
            .finish()
    }
}
