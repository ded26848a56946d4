//! Integration test utilities for the signaling relay
//!
//! This crate provides helpers for running end-to-end tests against
//! the WebSocket signaling server.

pub mod helpers;

pub use helpers::*;
