//! Liveness reporting: registry sizes plus process status.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ConnectionRegistry;

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    /// Always `"ok"` while the process is serving.
    pub status: String,
    /// RFC 3339 timestamp at which the report was built.
    pub timestamp: String,
    /// Number of registered producer connections.
    pub game_clients: usize,
    /// Number of registered consumer connections.
    pub web_clients: usize,
    /// Configured domain / identity string.
    pub domain: String,
}

/// Builds [`HealthReport`]s from the live registry.
///
/// Pure read: no side effects and no external calls, so it never fails.
#[derive(Debug, Clone)]
pub struct LivenessReporter {
    registry: Arc<ConnectionRegistry>,
    domain: String,
}

impl LivenessReporter {
    /// Status marker carried by every report.
    pub const STATUS_OK: &'static str = "ok";

    /// Creates a reporter for `registry`, identified by `domain`.
    #[must_use]
    pub fn new(registry: Arc<ConnectionRegistry>, domain: impl Into<String>) -> Self {
        Self {
            registry,
            domain: domain.into(),
        }
    }

    /// Returns the current status snapshot.
    pub async fn report(&self) -> HealthReport {
        let counts = self.registry.counts().await;
        HealthReport {
            status: Self::STATUS_OK.to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            game_clients: counts.producers,
            web_clients: counts.consumers,
            domain: self.domain.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::net::SocketAddr;

    use chrono::DateTime;

    use super::*;
    use crate::domain::ConnectionHandle;

    fn addr() -> SocketAddr {
        SocketAddr::from(([10, 0, 0, 1], 5000))
    }

    #[tokio::test]
    async fn empty_registry_reports_zero() {
        let reporter = LivenessReporter::new(Arc::new(ConnectionRegistry::new()), "relay.test");
        let report = reporter.report().await;

        assert_eq!(report.status, "ok");
        assert_eq!(report.game_clients, 0);
        assert_eq!(report.web_clients, 0);
        assert_eq!(report.domain, "relay.test");
        assert!(DateTime::parse_from_rfc3339(&report.timestamp).is_ok());
    }

    #[tokio::test]
    async fn reports_three_producers_and_five_consumers() {
        let registry = Arc::new(ConnectionRegistry::new());
        let mut receivers = Vec::new();
        for _ in 0..3 {
            let _ = registry.register(ConnectionHandle::producer(addr())).await;
        }
        for _ in 0..5 {
            let (consumer, rx) = ConnectionHandle::consumer(addr(), 4);
            receivers.push(rx);
            let _ = registry.register(consumer).await;
        }

        let report = LivenessReporter::new(registry, "d").report().await;
        assert_eq!(report.game_clients, 3);
        assert_eq!(report.web_clients, 5);
        assert_eq!(report.status, "ok");
    }

    #[tokio::test]
    async fn serializes_with_camel_case_keys() {
        let reporter = LivenessReporter::new(Arc::new(ConnectionRegistry::new()), "d");
        let Ok(value) = serde_json::to_value(reporter.report().await) else {
            panic!("report must serialize");
        };
        for key in ["status", "timestamp", "gameClients", "webClients", "domain"] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
    }
}
