//! Live connection handles and their lifecycle state.
//!
//! A [`ConnectionHandle`] is a cheap-clone view of one accepted transport
//! connection. The registry stores handles, the relay writes through them,
//! and the acceptor task that owns the socket drives the state machine:
//!
//! ```text
//! Connecting ──register──▶ Open ──close/error──▶ Closing ──unregister──▶ Closed
//! ```

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use super::ConnectionId;
use super::message::OutboundFrame;
use crate::error::DeliveryError;

/// Role of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionClass {
    /// Submits data for relay ("game" client).
    Producer,
    /// Receives relayed data ("web" client).
    Consumer,
}

impl fmt::Display for ConnectionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Producer => f.write_str("producer"),
            Self::Consumer => f.write_str("consumer"),
        }
    }
}

/// Transport state of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ConnectionState {
    /// Accepted but not yet registered.
    Connecting = 0,
    /// Registered; frames may be written.
    Open = 1,
    /// Close or error observed; removal pending.
    Closing = 2,
    /// Removed from the registry. Terminal.
    Closed = 3,
}

impl ConnectionState {
    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Connecting,
            1 => Self::Open,
            2 => Self::Closing,
            _ => Self::Closed,
        }
    }
}

/// Shared handle to one live connection.
///
/// Clones share the same state cell and outbound queue. Only consumer
/// handles have an outbound queue; producers never receive frames.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    class: ConnectionClass,
    remote_addr: SocketAddr,
    state: Arc<AtomicU8>,
    outbound: Option<mpsc::Sender<OutboundFrame>>,
}

impl ConnectionHandle {
    /// Creates a handle for a newly accepted producer connection.
    #[must_use]
    pub fn producer(remote_addr: SocketAddr) -> Self {
        Self {
            id: ConnectionId::new(),
            class: ConnectionClass::Producer,
            remote_addr,
            state: Arc::new(AtomicU8::new(ConnectionState::Connecting as u8)),
            outbound: None,
        }
    }

    /// Creates a handle for a newly accepted consumer connection.
    ///
    /// Returns the handle together with the receiving end of its outbound
    /// queue, which the connection's writer drains. A `capacity` of zero is
    /// treated as one.
    #[must_use]
    pub fn consumer(
        remote_addr: SocketAddr,
        capacity: usize,
    ) -> (Self, mpsc::Receiver<OutboundFrame>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let handle = Self {
            id: ConnectionId::new(),
            class: ConnectionClass::Consumer,
            remote_addr,
            state: Arc::new(AtomicU8::new(ConnectionState::Connecting as u8)),
            outbound: Some(tx),
        };
        (handle, rx)
    }

    /// Connection identifier.
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Connection class.
    #[must_use]
    pub const fn class(&self) -> ConnectionClass {
        self.class
    }

    /// Remote peer address.
    #[must_use]
    pub const fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    /// Current transport state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Returns `true` while the connection is [`ConnectionState::Open`].
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Moves the connection to `next`.
    ///
    /// `Closed` is terminal: once reached, later transitions are ignored.
    pub fn transition(&self, next: ConnectionState) {
        let _ = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |raw| {
                (ConnectionState::from_u8(raw) != ConnectionState::Closed).then_some(next as u8)
            });
    }

    /// Queues a frame for this connection without waiting.
    ///
    /// # Errors
    ///
    /// - [`DeliveryError::NotWritable`] for producer connections.
    /// - [`DeliveryError::QueueFull`] if the writer has fallen behind.
    /// - [`DeliveryError::QueueClosed`] if the writer has stopped.
    pub fn try_send(&self, frame: OutboundFrame) -> Result<(), DeliveryError> {
        let Some(outbound) = &self.outbound else {
            return Err(DeliveryError::NotWritable(self.class));
        };
        outbound.try_send(frame).map_err(|err| match err {
            TrySendError::Full(_) => DeliveryError::QueueFull,
            TrySendError::Closed(_) => DeliveryError::QueueClosed,
        })
    }
}
