//! Wire protocol
//!
//! JSON records with a `type` discriminator, exchanged over the WebSocket.

mod messages;

pub use messages::{ClientMessage, Outbound, RoomId, ServerMessage};
