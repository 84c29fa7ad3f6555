//! Channel router
//!
//! Binds live connections to broadcast channels and answers the reverse
//! lookup "which connections are on channel X". The router is a pure
//! pub/sub primitive: room membership authorization happens before
//! `subscribe` is called, never here.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;

use pulse_core::{Channel, ConnectionId, DomainError, PrincipalId};

use crate::connection::Connection;
use crate::registry::ConnectionRegistry;

/// Routes channels to the connections subscribed to them
pub struct ChannelRouter {
    registry: Arc<ConnectionRegistry>,

    /// Channel to connection ids mapping
    channel_connections: DashMap<Channel, HashSet<ConnectionId>>,
}

impl ChannelRouter {
    /// Create a new router over a registry
    #[must_use]
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            registry,
            channel_connections: DashMap::new(),
        }
    }

    /// Subscribe a connection to a channel
    ///
    /// Idempotent; re-subscribing is a no-op success.
    ///
    /// # Errors
    /// Returns `DomainError::UnknownConnection` if the connection is not
    /// registered (e.g. already closed).
    pub async fn subscribe(&self, id: ConnectionId, channel: Channel) -> Result<(), DomainError> {
        let Some(connection) = self.registry.get(id) else {
            return Err(DomainError::UnknownConnection(id));
        };

        connection.subscribe(channel).await;
        self.channel_connections
            .entry(channel)
            .or_default()
            .insert(id);

        tracing::trace!(connection_id = %id, channel = %channel, "Subscribed");
        Ok(())
    }

    /// Unsubscribe a connection from a channel
    ///
    /// Idempotent; leaving a channel never joined is a no-op success.
    ///
    /// # Errors
    /// Returns `DomainError::UnknownConnection` if the connection is not
    /// registered.
    pub async fn unsubscribe(&self, id: ConnectionId, channel: Channel) -> Result<(), DomainError> {
        let Some(connection) = self.registry.get(id) else {
            return Err(DomainError::UnknownConnection(id));
        };

        connection.unsubscribe(channel).await;
        self.detach(id, channel);

        tracing::trace!(connection_id = %id, channel = %channel, "Unsubscribed");
        Ok(())
    }

    /// Attach a connection to its owning principal's private inbox
    ///
    /// Called once at registration; the inbox subscription is implicit and
    /// cannot be manually removed.
    pub async fn attach_inbox(&self, connection: &Arc<Connection>) {
        let channel = Channel::inbox(connection.principal_id());
        connection.subscribe(channel).await;
        self.channel_connections
            .entry(channel)
            .or_default()
            .insert(connection.id());
    }

    /// Remove a closed connection from every channel it was on
    ///
    /// Called at unregister, after the connection has left the registry.
    pub async fn detach_all(&self, connection: &Arc<Connection>) {
        for channel in connection.channels().await {
            self.detach(connection.id(), channel);
        }
    }

    /// All live connections currently subscribed to a channel
    ///
    /// An empty result is valid and simply yields zero deliveries.
    pub fn subscribers_of(&self, channel: Channel) -> Vec<Arc<Connection>> {
        self.channel_connections
            .get(&channel)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.registry.get(*id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of connections subscribed to a channel
    pub fn subscriber_count(&self, channel: Channel) -> usize {
        self.channel_connections
            .get(&channel)
            .map_or(0, |ids| ids.len())
    }

    /// Principals with at least one connection on a channel
    pub fn subscriber_principals(&self, channel: Channel) -> HashSet<PrincipalId> {
        self.subscribers_of(channel)
            .iter()
            .map(|c| c.principal_id())
            .collect()
    }

    /// Atomically drop a connection from a channel entry, cleaning up the
    /// entry when it empties
    fn detach(&self, id: ConnectionId, channel: Channel) {
        self.channel_connections.alter(&channel, |_, mut ids| {
            ids.remove(&id);
            ids
        });
        self.channel_connections
            .remove_if(&channel, |_, ids| ids.is_empty());
    }
}

impl std::fmt::Debug for ChannelRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelRouter")
            .field("channels", &self.channel_connections.len())
            .finish()
    }
}
