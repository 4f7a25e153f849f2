//! Relay error types.
//!
//! [`RelayError`] covers process-level failures (configuration, binding
//! listeners). [`DeliveryError`] describes why a single frame could not be
//! queued for one connection; it is logged by the relay and never
//! propagated to callers of `broadcast`.

use crate::domain::ConnectionClass;

/// Process-level error enum.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Binding or serving a listener failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-destination enqueue failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The connection's outbound queue is full; the frame was dropped.
    #[error("outbound queue full")]
    QueueFull,

    /// The connection's writer task is gone; the transport is closing.
    #[error("outbound queue closed")]
    QueueClosed,

    /// The connection class has no outbound path.
    #[error("{0} connections do not accept outbound frames")]
    NotWritable(ConnectionClass),
}
