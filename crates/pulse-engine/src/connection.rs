//! Individual live connection
//!
//! One transport-level session, bound to exactly one principal at
//! construction (authentication happens before a connection exists here).

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, RwLock};

use pulse_core::{Channel, ConnectionId, PrincipalId, ServerEvent};

/// A single live connection
///
/// Outbound events are queued on an mpsc channel; the transport task on the
/// other end owns the actual socket write.
pub struct Connection {
    /// Unique connection id
    id: ConnectionId,

    /// Owning principal (fixed for the connection's lifetime)
    principal_id: PrincipalId,

    /// Channel to the transport's send task
    sender: mpsc::Sender<ServerEvent>,

    /// Channels this connection is subscribed to
    channels: RwLock<HashSet<Channel>>,

    /// Connection creation time
    created_at: Instant,
}

impl Connection {
    /// Create a new connection bound to a principal
    pub fn new(principal_id: PrincipalId, sender: mpsc::Sender<ServerEvent>) -> Arc<Self> {
        Arc::new(Self {
            id: ConnectionId::generate(),
            principal_id,
            sender,
            channels: RwLock::new(HashSet::new()),
            created_at: Instant::now(),
        })
    }

    /// Get the connection id
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Get the owning principal id
    pub fn principal_id(&self) -> PrincipalId {
        self.principal_id
    }

    /// Record a channel subscription
    pub async fn subscribe(&self, channel: Channel) {
        self.channels.write().await.insert(channel);
    }

    /// Remove a channel subscription
    pub async fn unsubscribe(&self, channel: Channel) {
        self.channels.write().await.remove(&channel);
    }

    /// Get all subscribed channels
    pub async fn channels(&self) -> Vec<Channel> {
        self.channels.read().await.iter().copied().collect()
    }

    /// Check if subscribed to a channel
    pub async fn is_subscribed(&self, channel: Channel) -> bool {
        self.channels.read().await.contains(&channel)
    }

    /// Get connection age
    pub fn age(&self) -> std::time::Duration {
        self.created_at.elapsed()
    }

    /// Send an event to this connection
    pub async fn send(
        &self,
        event: ServerEvent,
    ) -> Result<(), mpsc::error::SendError<ServerEvent>> {
        self.sender.send(event).await
    }

    /// Check if the transport side has hung up
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("principal_id", &self.principal_id)
            .field("created_at", &self.created_at)
            .finish()
    }
}
