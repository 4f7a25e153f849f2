//! Fan-out of producer payloads to consumer connections.
//!
//! [`BroadcastRelay`] takes a snapshot of the consumer set and queues the
//! payload on every consumer that is open at the moment of the write.
//! Queuing never waits, so one slow consumer cannot stall the producer or
//! any other consumer. Failures are logged per destination and never
//! returned to the caller.

use std::sync::Arc;

use serde::Serialize;

use super::message::{OutboundFrame, Payload};
use super::{ConnectionClass, ConnectionRegistry};
use crate::error::DeliveryError;

/// Outcome of one broadcast, for logging and diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BroadcastReport {
    /// Consumers that were open and got a write attempt.
    pub attempted: usize,
    /// Attempts that were queued successfully.
    pub delivered: usize,
    /// Consumers in the snapshot that were no longer open.
    pub skipped: usize,
    /// Attempts that failed (queue full or closed).
    pub failed: usize,
}

/// Delivers producer payloads to every open consumer.
///
/// Observes connections only through the registry; it never registers or
/// unregisters anything itself.
#[derive(Debug, Clone)]
pub struct BroadcastRelay {
    registry: Arc<ConnectionRegistry>,
}

impl BroadcastRelay {
    /// Creates a relay reading consumers from `registry`.
    #[must_use]
    pub const fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Returns the registry this relay reads from.
    #[must_use]
    pub const fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Queues `payload` on every consumer that is currently open.
    pub async fn broadcast(&self, payload: Payload) -> BroadcastReport {
        let consumers = self.registry.snapshot(ConnectionClass::Consumer).await;
        let mut report = BroadcastReport::default();

        for consumer in &consumers {
            if !consumer.is_open() {
                report.skipped += 1;
                continue;
            }

            report.attempted += 1;
            match consumer.try_send(OutboundFrame::Relay(payload.clone())) {
                Ok(()) => report.delivered += 1,
                Err(err @ DeliveryError::QueueFull) => {
                    report.failed += 1;
                    tracing::warn!(
                        remote = %consumer.remote_addr(),
                        connection_id = %consumer.id(),
                        error = %err,
                        "consumer lagging, payload dropped"
                    );
                }
                Err(err) => {
                    report.failed += 1;
                    tracing::warn!(
                        remote = %consumer.remote_addr(),
                        connection_id = %consumer.id(),
                        error = %err,
                        "failed to relay payload to consumer"
                    );
                }
            }
        }

        report
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::net::SocketAddr;

    use tokio::sync::mpsc;

    use super::*;
    use crate::domain::{ConnectionHandle, ConnectionState};

    fn addr(port: u16) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], port))
    }

    async fn open_consumer(
        registry: &ConnectionRegistry,
        port: u16,
        capacity: usize,
    ) -> (ConnectionHandle, mpsc::Receiver<OutboundFrame>) {
        let (handle, rx) = ConnectionHandle::consumer(addr(port), capacity);
        assert!(registry.register(handle.clone()).await);
        (handle, rx)
    }

    #[tokio::test]
    async fn every_open_consumer_gets_identical_payload() {
        let registry = Arc::new(ConnectionRegistry::new());
        let relay = BroadcastRelay::new(Arc::clone(&registry));
        let mut receivers = Vec::new();
        for port in 0..3 {
            let (_, rx) = open_consumer(&registry, port, 8).await;
            receivers.push(rx);
        }

        let report = relay.broadcast(Payload::from("pos:10,20")).await;
        assert_eq!(
            report,
            BroadcastReport {
                attempted: 3,
                delivered: 3,
                skipped: 0,
                failed: 0,
            }
        );

        for rx in &mut receivers {
            assert_eq!(
                rx.try_recv().ok(),
                Some(OutboundFrame::Relay(Payload::from("pos:10,20")))
            );
            assert!(rx.try_recv().is_err());
        }
    }

    #[tokio::test]
    async fn no_consumers_means_no_attempts() {
        let registry = Arc::new(ConnectionRegistry::new());
        let _ = registry
            .register(ConnectionHandle::producer(addr(9)))
            .await;
        let relay = BroadcastRelay::new(registry);

        let report = relay.broadcast(Payload::from("x")).await;
        assert_eq!(report, BroadcastReport::default());
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_the_rest() {
        let registry = Arc::new(ConnectionRegistry::new());
        let relay = BroadcastRelay::new(Arc::clone(&registry));
        let (_, mut rx_a) = open_consumer(&registry, 1, 8).await;
        let (dead, rx_dead) = open_consumer(&registry, 2, 8).await;
        let (_, mut rx_b) = open_consumer(&registry, 3, 8).await;
        drop(rx_dead);

        let report = relay.broadcast(Payload::from("m")).await;
        assert_eq!(report.attempted, 3);
        assert_eq!(report.delivered, 2);
        assert_eq!(report.failed, 1);

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_ok());
        // A failed write alone does not unregister the consumer.
        assert_eq!(registry.counts().await.consumers, 3);
        assert!(dead.is_open());
    }

    #[tokio::test]
    async fn full_queue_drops_only_for_that_consumer() {
        let registry = Arc::new(ConnectionRegistry::new());
        let relay = BroadcastRelay::new(Arc::clone(&registry));
        let (_, mut slow) = open_consumer(&registry, 1, 1).await;
        let (_, mut fast) = open_consumer(&registry, 2, 8).await;

        let first = relay.broadcast(Payload::from("1")).await;
        let second = relay.broadcast(Payload::from("2")).await;
        assert_eq!(first.delivered, 2);
        assert_eq!(second.delivered, 1);
        assert_eq!(second.failed, 1);

        assert_eq!(slow.try_recv().ok(), Some(OutboundFrame::Relay(Payload::from("1"))));
        assert!(slow.try_recv().is_err());
        assert_eq!(fast.try_recv().ok(), Some(OutboundFrame::Relay(Payload::from("1"))));
        assert_eq!(fast.try_recv().ok(), Some(OutboundFrame::Relay(Payload::from("2"))));
    }

    #[tokio::test]
    async fn closing_consumer_is_skipped() {
        let registry = Arc::new(ConnectionRegistry::new());
        let relay = BroadcastRelay::new(Arc::clone(&registry));
        let (closing, mut rx_closing) = open_consumer(&registry, 1, 8).await;
        let (_, mut rx_open) = open_consumer(&registry, 2, 8).await;
        closing.transition(ConnectionState::Closing);

        let report = relay.broadcast(Payload::from("m")).await;
        assert_eq!(report.attempted, 1);
        assert_eq!(report.skipped, 1);
        assert!(rx_closing.try_recv().is_err());
        assert!(rx_open.try_recv().is_ok());
    }

    #[tokio::test]
    async fn unregistered_consumer_receives_nothing() {
        let registry = Arc::new(ConnectionRegistry::new());
        let relay = BroadcastRelay::new(Arc::clone(&registry));
        let (gone, mut rx_gone) = open_consumer(&registry, 1, 8).await;
        let (_, mut rx_stay) = open_consumer(&registry, 2, 8).await;

        let _ = registry.unregister(gone.id()).await;
        gone.transition(ConnectionState::Closed);

        let report = relay.broadcast(Payload::from("m")).await;
        assert_eq!(report.attempted, 1);
        assert_eq!(registry.counts().await.consumers, 1);
        assert!(rx_gone.try_recv().is_err());
        assert!(rx_stay.try_recv().is_ok());
    }

    #[tokio::test]
    async fn sequential_broadcasts_keep_order() {
        let registry = Arc::new(ConnectionRegistry::new());
        let relay = BroadcastRelay::new(Arc::clone(&registry));
        let (_, mut rx) = open_consumer(&registry, 1, 16).await;

        for i in 0..10 {
            let _ = relay.broadcast(Payload::from(i.to_string())).await;
        }
        for i in 0..10 {
            assert_eq!(
                rx.try_recv().ok(),
                Some(OutboundFrame::Relay(Payload::from(i.to_string())))
            );
        }
    }
}
