//! WebSocket layer: upgrade handlers and per-connection loops.
//!
//! Producers and consumers connect on separate listeners. Producer frames
//! are fanned out through the broadcast relay; consumers receive a welcome
//! frame followed by relayed payloads.

pub mod connection;
pub mod handler;

pub use handler::{consumer_router, producer_router};
