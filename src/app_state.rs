//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::RelayConfig;
use crate::domain::{BroadcastRelay, ConnectionRegistry};
use crate::service::LivenessReporter;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Registry of open producer and consumer connections.
    pub registry: Arc<ConnectionRegistry>,
    /// Fan-out relay over the consumer set.
    pub relay: BroadcastRelay,
    /// Health reporting over the registry.
    pub liveness: LivenessReporter,
    /// Loaded configuration.
    pub config: Arc<RelayConfig>,
}

impl AppState {
    /// Builds the state graph around a fresh, empty registry.
    #[must_use]
    pub fn new(config: RelayConfig) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        Self {
            relay: BroadcastRelay::new(Arc::clone(&registry)),
            liveness: LivenessReporter::new(Arc::clone(&registry), config.domain.clone()),
            registry,
            config: Arc::new(config),
        }
    }
}
