//! Gateway state
//!
//! Application state for the signaling server.

use crate::connection::ConnectionRegistry;
use crate::room::RoomRouter;
use signal_common::AppConfig;
use std::sync::Arc;

/// Shared state for the signaling server
#[derive(Clone)]
pub struct GatewayState {
    /// Registry of live connections
    registry: Arc<ConnectionRegistry>,
    /// Room admission, relay, and teardown
    router: Arc<RoomRouter>,
    /// Application configuration
    config: Arc<AppConfig>,
}

impl GatewayState {
    /// Create a new gateway state
    pub fn new(config: AppConfig) -> Self {
        Self {
            registry: ConnectionRegistry::new_shared(),
            router: RoomRouter::new_shared(),
            config: Arc::new(config),
        }
    }

    /// Get the connection registry
    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Get the room router
    pub fn router(&self) -> &RoomRouter {
        &self.router
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("registry", &self.registry)
            .field("router", &self.router)
            .finish()
    }
}
