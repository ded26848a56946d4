//! Signaling message format
//!
//! Every frame is a JSON object with a `type` field. Client messages form a
//! closed set; anything that fails to parse is dropped by the caller.
//! Negotiation payloads (`offer`, `answer`, `candidate`) are opaque to the
//! relay and are never inspected or re-serialized.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Room identifier supplied by the client
///
/// Clients may send the `room` field as a JSON string or number; both forms
/// coerce to the string representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RoomId(String);

impl RoomId {
    /// Create a room ID from a string key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Get the room key as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether the key is empty
    ///
    /// Empty keys are a client-side precondition violation and must be
    /// rejected before reaching the room router.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RoomId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RoomKeyVisitor;

        impl Visitor<'_> for RoomKeyVisitor {
            type Value = RoomId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or number room key")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<RoomId, E> {
                Ok(RoomId(v.to_owned()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<RoomId, E> {
                Ok(RoomId(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<RoomId, E> {
                Ok(RoomId(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<RoomId, E> {
                Ok(RoomId(v.to_string()))
            }
        }

        deserializer.deserialize_any(RoomKeyVisitor)
    }
}

/// Messages received from clients
///
/// The tag set is closed: unknown `type` values fail to deserialize and the
/// frame is dropped. All variants except `Join` are relayed verbatim to the
/// other room member; their payloads are captured here only to document the
/// wire shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    /// Admission request for a room
    Join { room: RoomId },
    /// Session description offer, relayed verbatim
    Offer { offer: Value },
    /// Session description answer, relayed verbatim
    Answer { answer: Value },
    /// Connectivity candidate, relayed verbatim
    Ice { candidate: Value },
}

impl ClientMessage {
    /// Deserialize from JSON text
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check whether this message is an admission request
    #[must_use]
    pub fn is_join(&self) -> bool {
        matches!(self, Self::Join { .. })
    }
}

/// Messages originated by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Admission accepted; `count` is the post-admission member count
    Joined { count: usize },
    /// Admission rejected, room at capacity
    Full,
    /// Directive to the first-admitted member: initiate the offer
    StartOffer,
    /// The other room member disconnected
    PartnerLeft,
}

impl ServerMessage {
    /// Serialize to JSON text
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// A frame queued for delivery to a connection's writer task
///
/// Relayed frames carry the sender's original text so the receiving peer
/// sees it byte-for-byte; server events are serialized at send time.
#[derive(Debug, Clone)]
pub enum Outbound {
    /// A server-originated event
    Event(ServerMessage),
    /// Verbatim text relayed from the other room member
    Relay(String),
}

impl Outbound {
    /// Produce the text to put on the wire
    pub fn into_text(self) -> Result<String, serde_json::Error> {
        match self {
            Self::Event(msg) => msg.to_json(),
            Self::Relay(text) => Ok(text),
        }
    }
}
