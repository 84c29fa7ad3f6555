//! Connection registry
//!
//! Authoritative in-memory bidirectional map between principals and their
//! live connections. One instance per process, constructor-injected into
//! everything that needs it. Presence derivation reacts to the transition
//! flags returned here; the registry itself has no side effects.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use pulse_core::{ConnectionId, DomainError, PrincipalId};

use crate::connection::Connection;

/// Registry of all live connections
///
/// Uses `DashMap` for concurrent access; each operation is a short critical
/// section with no suspension inside.
pub struct ConnectionRegistry {
    /// Live connections by connection id
    connections: DashMap<ConnectionId, Arc<Connection>>,

    /// Principal id to connection ids mapping
    principal_connections: DashMap<PrincipalId, HashSet<ConnectionId>>,
}

impl ConnectionRegistry {
    /// Create a new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            principal_connections: DashMap::new(),
        }
    }

    /// Create a new registry wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a connection
    ///
    /// Returns whether this is the principal's first live connection (the
    /// online transition edge).
    ///
    /// # Errors
    /// Returns `DomainError::DuplicateConnection` if the connection id is
    /// already registered.
    pub fn register(&self, connection: Arc<Connection>) -> Result<bool, DomainError> {
        let id = connection.id();
        let principal_id = connection.principal_id();

        match self.connections.entry(id) {
            Entry::Occupied(_) => return Err(DomainError::DuplicateConnection(id)),
            Entry::Vacant(slot) => {
                slot.insert(connection);
            }
        }

        let mut ids = self.principal_connections.entry(principal_id).or_default();
        let first_for_principal = ids.is_empty();
        ids.insert(id);
        drop(ids);

        tracing::debug!(
            connection_id = %id,
            principal_id = %principal_id,
            first = first_for_principal,
            "Connection registered"
        );

        Ok(first_for_principal)
    }

    /// Unregister a connection
    ///
    /// Unknown ids are a no-op (`None`) so duplicate close events from a
    /// flaky transport are harmless. Otherwise returns the freed principal
    /// and whether that principal now has zero remaining connections (the
    /// offline transition edge).
    pub fn unregister(&self, id: ConnectionId) -> Option<(PrincipalId, bool)> {
        let (_, connection) = self.connections.remove(&id)?;
        let principal_id = connection.principal_id();

        self.principal_connections.alter(&principal_id, |_, mut ids| {
            ids.remove(&id);
            ids
        });

        // Atomically drop the entry if this was the last connection
        let last_for_principal = self
            .principal_connections
            .remove_if(&principal_id, |_, ids| ids.is_empty())
            .is_some();

        tracing::debug!(
            connection_id = %id,
            principal_id = %principal_id,
            last = last_for_principal,
            "Connection unregistered"
        );

        Some((principal_id, last_for_principal))
    }

    /// Get a connection by id
    pub fn get(&self, id: ConnectionId) -> Option<Arc<Connection>> {
        self.connections.get(&id).map(|r| r.clone())
    }

    /// Check if a connection id is registered
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(&id)
    }

    /// All live connections of a principal (possibly empty)
    pub fn connections_for(&self, principal_id: PrincipalId) -> Vec<Arc<Connection>> {
        self.principal_connections
            .get(&principal_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.connections.get(id).map(|c| c.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// True iff the principal has at least one live connection
    pub fn is_online(&self, principal_id: PrincipalId) -> bool {
        self.principal_connections
            .get(&principal_id)
            .is_some_and(|ids| !ids.is_empty())
    }

    /// All live connections across all principals
    pub fn all_connections(&self) -> Vec<Arc<Connection>> {
        self.connections.iter().map(|r| r.clone()).collect()
    }

    /// Total number of live connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Number of distinct online principals
    pub fn principal_count(&self) -> usize {
        self.principal_connections.len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("connections", &self.connections.len())
            .field("principals", &self.principal_connections.len())
            .finish()
    }
}
