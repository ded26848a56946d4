//! # signal-gateway
//!
//! WebSocket signaling relay. Pairs two clients that share a room key and
//! forwards their negotiation messages (offer/answer/ICE) verbatim without
//! interpreting them.

pub mod connection;
pub mod protocol;
pub mod room;
pub mod server;
