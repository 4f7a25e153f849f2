//! Domain layer: connections, the connection registry, and the relay.
//!
//! This module holds the relay core: connection identity and lifecycle,
//! the frames sent to consumers, the per-class registry of open
//! connections, and the broadcast relay that fans payloads out.

pub mod connection;
pub mod connection_id;
pub mod message;
pub mod registry;
pub mod relay;

pub use connection::{ConnectionClass, ConnectionHandle, ConnectionState};
pub use connection_id::ConnectionId;
pub use message::{OutboundFrame, Payload, WelcomeMessage};
pub use registry::{ConnectionRegistry, RegistryCounts};
pub use relay::{BroadcastRelay, BroadcastReport};
