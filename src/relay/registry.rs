use dashmap::DashMap;
use std::sync::Arc;

use super::{ConnectionId, ConnectionSender};

/// Connection registry: tracks all live WebSocket connections.
///
/// A connection present in the registry may be written to by the broadcaster
/// at any instant; a connection absent from it will never be written again.
/// Entries are added once when the handshake completes and removed exactly
/// once at the first I/O failure from either the read or the write side —
/// both sides may race to deregister the same connection, so removal is
/// idempotent.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<DashMap<ConnectionId, ConnectionSender>>,
}

impl Registry {
    /// Create a new empty connection registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection. Subsequent broadcasts include it.
    pub fn register(&self, id: ConnectionId, sender: ConnectionSender) {
        self.inner.insert(id, sender);
        tracing::debug!(connection = %id, live = self.inner.len(), "connection registered");
    }

    /// Remove a connection from the live set. Removing an already-absent
    /// connection is a no-op; returns whether the entry was present.
    pub fn deregister(&self, id: ConnectionId) -> bool {
        let removed = self.inner.remove(&id).is_some();
        if removed {
            tracing::debug!(connection = %id, live = self.inner.len(), "connection deregistered");
        }
        removed
    }

    /// Current members, for one broadcast pass. Iteration order is
    /// unspecified. Deregistrations racing with the snapshot only make a
    /// sender in it fail on send, which the broadcaster handles.
    pub fn snapshot(&self) -> Vec<(ConnectionId, ConnectionSender)> {
        self.inner
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }

    /// Number of live connections.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the registry has no live connections.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
