//! Message fan-out engine
//!
//! Given a durably-persisted message record, delivers it to the right live
//! connections exactly once per connection, confirms to every connection of
//! the sender, and raises a lightweight room-activity hint to members not
//! receiving the payload path.
//!
//! The engine is a read-only consumer of the registry and router. It must
//! only ever be invoked after the persistence write has been acknowledged;
//! it never emits for an unpersisted message. Transport write failures are
//! logged, reported to the observer hook, and skipped - a partial fan-out
//! never rolls back the persisted message and never retries.

use std::sync::Arc;

use pulse_core::{
    ActivityCause, Channel, ConnectionId, MessageRecord, MessageTarget, RoomRepository,
    ServerEvent,
};

use crate::connection::Connection;
use crate::registry::ConnectionRegistry;
use crate::router::ChannelRouter;

/// Observer hook for delivery failures
///
/// The engine never retries or surfaces a failed transport write to the
/// sender; this hook exists so operators can count or trace them.
pub trait DeliveryObserver: Send + Sync {
    /// Called once per connection whose transport write failed
    fn on_delivery_failure(&self, connection_id: ConnectionId, event_name: &'static str);
}

/// Outcome of a single fan-out pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanoutReport {
    /// Delivery events successfully queued to receiver connections
    pub delivered: usize,
    /// Confirmation events successfully queued to sender connections
    pub confirmed: usize,
    /// Room-activity hints successfully queued
    pub notified: usize,
    /// Transport writes that failed and were skipped
    pub failed: usize,
}

/// Fans persisted messages out to live connections
pub struct FanoutEngine {
    registry: Arc<ConnectionRegistry>,
    router: Arc<ChannelRouter>,
    rooms: Arc<dyn RoomRepository>,
    observer: Option<Arc<dyn DeliveryObserver>>,
}

impl FanoutEngine {
    /// Create a new fan-out engine
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        router: Arc<ChannelRouter>,
        rooms: Arc<dyn RoomRepository>,
    ) -> Self {
        Self {
            registry,
            router,
            rooms,
            observer: None,
        }
    }

    /// Attach a delivery-failure observer
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn DeliveryObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Deliver a durably-persisted message
    ///
    /// Room messages go to every connection subscribed to the room channel
    /// except the sender's own; direct messages go to every live connection
    /// of the receiver regardless of subscriptions. Every connection of the
    /// sender gets a distinct confirmation event so other devices stay in
    /// sync. Room members not on the payload path get an activity hint on
    /// their inbox.
    pub async fn deliver(&self, record: &MessageRecord) -> FanoutReport {
        let sender_id = record.sender.id;
        let mut report = FanoutReport::default();

        // Membership lookup happens before any registry/router access so no
        // map is held across a suspension point.
        let activity_members = match record.target {
            MessageTarget::Room { room_id } => match self.rooms.member_ids(room_id).await {
                Ok(members) => members,
                Err(e) => {
                    tracing::warn!(
                        room_id = %room_id,
                        error = %e,
                        "Member lookup failed; skipping activity notifications"
                    );
                    Vec::new()
                }
            },
            MessageTarget::Direct { .. } => Vec::new(),
        };

        // Delivery events
        match record.target {
            MessageTarget::Room { room_id } => {
                let event = ServerEvent::NewRoomMessage(record.clone());
                for conn in self.router.subscribers_of(Channel::room(room_id)) {
                    if conn.principal_id() == sender_id {
                        continue;
                    }
                    self.emit(&conn, event.clone(), &mut report.delivered, &mut report.failed)
                        .await;
                }
            }
            MessageTarget::Direct { receiver_id } => {
                let event = ServerEvent::NewDirectMessage(record.clone());
                for conn in self.registry.connections_for(receiver_id) {
                    self.emit(&conn, event.clone(), &mut report.delivered, &mut report.failed)
                        .await;
                }
            }
        }

        // Confirmation to every connection of the sender, not just the
        // originating one
        let confirmation = ServerEvent::MessageSent(record.clone());
        for conn in self.registry.connections_for(sender_id) {
            self.emit(
                &conn,
                confirmation.clone(),
                &mut report.confirmed,
                &mut report.failed,
            )
            .await;
        }

        // Room-activity hint to each member's inbox, excluding the sender
        if let Some(room_id) = record.target.room_id() {
            let event = ServerEvent::RoomActivity {
                room_id,
                cause: ActivityCause::NewMessage,
            };
            for member_id in activity_members {
                if member_id == sender_id {
                    continue;
                }
                for conn in self.registry.connections_for(member_id) {
                    self.emit(&conn, event.clone(), &mut report.notified, &mut report.failed)
                        .await;
                }
            }
        }

        tracing::debug!(
            message_id = %record.id,
            delivered = report.delivered,
            confirmed = report.confirmed,
            notified = report.notified,
            failed = report.failed,
            "Fan-out complete"
        );

        report
    }

    async fn emit(
        &self,
        conn: &Arc<Connection>,
        event: ServerEvent,
        ok_count: &mut usize,
        fail_count: &mut usize,
    ) {
        let name = event.name();
        if conn.send(event).await.is_ok() {
            *ok_count += 1;
        } else {
            *fail_count += 1;
            tracing::debug!(
                connection_id = %conn.id(),
                event = name,
                "Transport write failed; skipping connection"
            );
            if let Some(observer) = &self.observer {
                observer.on_delivery_failure(conn.id(), name);
            }
        }
    }
}
