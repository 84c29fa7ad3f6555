//! Realtime hub
//!
//! Composes the registry, router, presence tracker, fan-out engine, and
//! relay behind the connection lifecycle. One hub per process; the gateway
//! holds it in shared state and drives it from socket events.

use std::sync::Arc;

use tokio::sync::mpsc;

use pulse_core::{
    ConnectionId, DomainError, PrincipalId, PrincipalRepository, RoomRepository, ServerEvent,
};

use crate::connection::Connection;
use crate::fanout::FanoutEngine;
use crate::presence::PresenceTracker;
use crate::registry::ConnectionRegistry;
use crate::relay::SignalRelay;
use crate::router::ChannelRouter;

/// The composed real-time core
pub struct RealtimeHub {
    registry: Arc<ConnectionRegistry>,
    router: Arc<ChannelRouter>,
    presence: PresenceTracker,
    fanout: FanoutEngine,
    relay: SignalRelay,
}

impl RealtimeHub {
    /// Wire up a hub from its persistence collaborators
    pub fn new(
        principals: Arc<dyn PrincipalRepository>,
        rooms: Arc<dyn RoomRepository>,
    ) -> Self {
        let registry = ConnectionRegistry::new_shared();
        let router = Arc::new(ChannelRouter::new(registry.clone()));
        let presence = PresenceTracker::new(registry.clone(), principals);
        let fanout = FanoutEngine::new(registry.clone(), router.clone(), rooms);
        let relay = SignalRelay::new(registry.clone(), router.clone());

        Self {
            registry,
            router,
            presence,
            fanout,
            relay,
        }
    }

    /// Replace the fan-out engine (to attach a delivery observer)
    #[must_use]
    pub fn with_fanout(mut self, fanout: FanoutEngine) -> Self {
        self.fanout = fanout;
        self
    }

    /// Bring a freshly authenticated connection online
    ///
    /// Registers it, attaches the implicit inbox subscription, and fires
    /// the presence-online edge if this is the principal's first device.
    ///
    /// # Errors
    /// Returns `DomainError::DuplicateConnection` if the generated
    /// connection id collides with a registered one.
    pub async fn connect(
        &self,
        principal_id: PrincipalId,
        sender: mpsc::Sender<ServerEvent>,
    ) -> Result<Arc<Connection>, DomainError> {
        let connection = Connection::new(principal_id, sender);
        let first = self.registry.register(connection.clone())?;
        self.router.attach_inbox(&connection).await;

        if first {
            self.presence.principal_online(principal_id).await;
        }

        Ok(connection)
    }

    /// Tear a connection down
    ///
    /// Safe to call more than once for the same id; cleanup and the
    /// presence-offline edge run exactly once.
    pub async fn disconnect(&self, id: ConnectionId) {
        let Some(connection) = self.registry.get(id) else {
            return;
        };
        let Some((principal_id, last)) = self.registry.unregister(id) else {
            return;
        };

        self.router.detach_all(&connection).await;

        if last {
            self.presence.principal_offline(principal_id).await;
        }
    }

    /// The connection registry
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// The channel router
    pub fn router(&self) -> &Arc<ChannelRouter> {
        &self.router
    }

    /// The fan-out engine
    pub fn fanout(&self) -> &FanoutEngine {
        &self.fanout
    }

    /// The signal relay
    pub fn relay(&self) -> &SignalRelay {
        &self.relay
    }
}

impl std::fmt::Debug for RealtimeHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeHub")
            .field("connections", &self.registry.connection_count())
            .field("principals", &self.registry.principal_count())
            .finish()
    }
}
