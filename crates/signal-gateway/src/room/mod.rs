//! Room management
//!
//! Admission control, verbatim relay, and membership teardown for
//! two-party rooms.

mod router;

pub use router::{JoinOutcome, RoomRouter, ROOM_CAPACITY};
