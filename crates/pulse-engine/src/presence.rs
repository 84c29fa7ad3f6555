//! Presence tracker
//!
//! Translates registry transition edges into durable presence writes and
//! online/offline broadcasts. Presence is edge-triggered: a principal's
//! second connection never re-announces online, and only the last close
//! announces offline.
//!
//! Presence store writes are best-effort: a failed write is logged and
//! swallowed, never a reason to fail the connection lifecycle. The
//! broadcast currently reaches every connected principal; scoping it to
//! friends or room-mates would need an authorization source this core does
//! not have.

use std::sync::Arc;

use chrono::Utc;

use pulse_core::{PrincipalId, PrincipalRepository, ServerEvent};

use crate::registry::ConnectionRegistry;

/// Derives and publishes presence state from registry transitions
pub struct PresenceTracker {
    registry: Arc<ConnectionRegistry>,
    principals: Arc<dyn PrincipalRepository>,
}

impl PresenceTracker {
    /// Create a new presence tracker
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        principals: Arc<dyn PrincipalRepository>,
    ) -> Self {
        Self {
            registry,
            principals,
        }
    }

    /// Handle a principal's online edge (first connection registered)
    ///
    /// Callers must only invoke this when the registry reported the first
    /// connection; calling it on subsequent registrations would violate
    /// edge triggering.
    pub async fn principal_online(&self, principal_id: PrincipalId) {
        if let Err(e) = self
            .principals
            .set_presence(principal_id, true, Utc::now())
            .await
        {
            tracing::warn!(
                principal_id = %principal_id,
                error = %e,
                "Presence write failed (online); continuing"
            );
        }

        self.broadcast_except(principal_id, ServerEvent::UserOnline {
            user_id: principal_id,
        })
        .await;

        tracing::info!(principal_id = %principal_id, "Principal online");
    }

    /// Handle a principal's offline edge (last connection unregistered)
    pub async fn principal_offline(&self, principal_id: PrincipalId) {
        let last_seen = Utc::now();

        if let Err(e) = self
            .principals
            .set_presence(principal_id, false, last_seen)
            .await
        {
            tracing::warn!(
                principal_id = %principal_id,
                error = %e,
                "Presence write failed (offline); continuing"
            );
        }

        self.broadcast_except(principal_id, ServerEvent::UserOffline {
            user_id: principal_id,
            last_seen,
        })
        .await;

        tracing::info!(principal_id = %principal_id, "Principal offline");
    }

    /// Send an event to every connection except those owned by `except`
    async fn broadcast_except(&self, except: PrincipalId, event: ServerEvent) {
        for conn in self.registry.all_connections() {
            if conn.principal_id() == except {
                continue;
            }
            if conn.send(event.clone()).await.is_err() {
                tracing::trace!(
                    connection_id = %conn.id(),
                    event = %event,
                    "Presence broadcast skipped dead connection"
                );
            }
        }
    }
}
