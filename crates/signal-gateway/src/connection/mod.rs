//! Connection tracking
//!
//! Per-connection state and the process-wide registry of live connections.

mod connection;
mod registry;

pub use connection::Connection;
pub use registry::ConnectionRegistry;
