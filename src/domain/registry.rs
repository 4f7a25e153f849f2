//! Registry of live connections, split by class.
//!
//! [`ConnectionRegistry`] keeps producers and consumers in two disjoint
//! maps behind a single [`tokio::sync::RwLock`], so every read sees both
//! sets at the same point in time.

use std::collections::HashMap;

use serde::Serialize;
use tokio::sync::RwLock;

use super::{ConnectionClass, ConnectionHandle, ConnectionId, ConnectionState};

/// Sizes of both connection sets at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegistryCounts {
    /// Number of registered producer connections.
    pub producers: usize,
    /// Number of registered consumer connections.
    pub consumers: usize,
}

#[derive(Debug, Default)]
struct Sets {
    producers: HashMap<ConnectionId, ConnectionHandle>,
    consumers: HashMap<ConnectionId, ConnectionHandle>,
}

impl Sets {
    fn for_class(&self, class: ConnectionClass) -> &HashMap<ConnectionId, ConnectionHandle> {
        match class {
            ConnectionClass::Producer => &self.producers,
            ConnectionClass::Consumer => &self.consumers,
        }
    }

    fn for_class_mut(
        &mut self,
        class: ConnectionClass,
    ) -> &mut HashMap<ConnectionId, ConnectionHandle> {
        match class {
            ConnectionClass::Producer => &mut self.producers,
            ConnectionClass::Consumer => &mut self.consumers,
        }
    }

    fn contains(&self, id: ConnectionId) -> bool {
        self.producers.contains_key(&id) || self.consumers.contains_key(&id)
    }
}

/// Central store of currently open connections.
///
/// Mutated only by the task that owns each connection (insert on accept,
/// remove on close or error). Read by the broadcast relay and the liveness
/// reporter.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    sets: RwLock<Sets>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to the set for its class and marks it open.
    ///
    /// Returns `false` and leaves the registry untouched if the connection
    /// is already registered or has already closed.
    pub async fn register(&self, handle: ConnectionHandle) -> bool {
        let mut sets = self.sets.write().await;
        if sets.contains(handle.id()) || handle.state() != ConnectionState::Connecting {
            tracing::warn!(
                connection_id = %handle.id(),
                class = %handle.class(),
                state = ?handle.state(),
                "refusing to register connection"
            );
            return false;
        }
        handle.transition(ConnectionState::Open);
        sets.for_class_mut(handle.class()).insert(handle.id(), handle);
        true
    }

    /// Removes a connection from whichever set holds it.
    ///
    /// Idempotent: returns the removed handle the first time and `None` on
    /// every later call for the same id.
    pub async fn unregister(&self, id: ConnectionId) -> Option<ConnectionHandle> {
        let mut sets = self.sets.write().await;
        sets.producers
            .remove(&id)
            .or_else(|| sets.consumers.remove(&id))
    }

    /// Returns the members of one set as an owned snapshot.
    ///
    /// The snapshot is detached from the registry: connections registering
    /// or leaving while the caller iterates do not affect it.
    pub async fn snapshot(&self, class: ConnectionClass) -> Vec<ConnectionHandle> {
        self.sets.read().await.for_class(class).values().cloned().collect()
    }

    /// Returns the current size of both sets.
    pub async fn counts(&self) -> RegistryCounts {
        let sets = self.sets.read().await;
        RegistryCounts {
            producers: sets.producers.len(),
            consumers: sets.consumers.len(),
        }
    }
}
