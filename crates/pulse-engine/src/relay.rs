//! Typing and read-receipt relay
//!
//! Ephemeral signals routed with the same channel addressing as message
//! fan-out, with no persistence step. Each call produces at most one
//! broadcast attempt: no deduplication, no retry, and no server-side
//! staleness timeout (a stuck "typing" state is the client's problem).

use std::sync::Arc;

use chrono::Utc;

use pulse_core::{Channel, MessageId, PrincipalId, RoomId, SenderSummary, ServerEvent};

use crate::registry::ConnectionRegistry;
use crate::router::ChannelRouter;

/// Where a typing signal is addressed, mirroring message targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingTarget {
    /// Typing in a room
    Room(RoomId),
    /// Typing in a direct conversation
    Receiver(PrincipalId),
}

impl TypingTarget {
    /// Room id, if addressed at a room
    #[must_use]
    pub fn room_id(&self) -> Option<RoomId> {
        match *self {
            Self::Room(room_id) => Some(room_id),
            Self::Receiver(_) => None,
        }
    }
}

/// Routes typing indicators and read receipts to live connections
pub struct SignalRelay {
    registry: Arc<ConnectionRegistry>,
    router: Arc<ChannelRouter>,
}

impl SignalRelay {
    /// Create a new relay
    pub fn new(registry: Arc<ConnectionRegistry>, router: Arc<ChannelRouter>) -> Self {
        Self { registry, router }
    }

    /// Relay a typing start/stop signal
    ///
    /// Delivered to every subscriber/connection of the target except the
    /// sender's own connections. Returns the number of queued events; an
    /// empty target is zero deliveries, not an error.
    pub async fn relay_typing(
        &self,
        sender: &SenderSummary,
        target: TypingTarget,
        is_typing: bool,
    ) -> usize {
        let event = if is_typing {
            ServerEvent::UserTyping {
                user: sender.clone(),
                room_id: target.room_id(),
            }
        } else {
            ServerEvent::UserStoppedTyping {
                user_id: sender.id,
                room_id: target.room_id(),
            }
        };

        let targets = match target {
            TypingTarget::Room(room_id) => self.router.subscribers_of(Channel::room(room_id)),
            TypingTarget::Receiver(receiver_id) => self.registry.connections_for(receiver_id),
        };

        let mut sent = 0;
        for conn in targets {
            if conn.principal_id() == sender.id {
                continue;
            }
            if conn.send(event.clone()).await.is_ok() {
                sent += 1;
            } else {
                tracing::trace!(
                    connection_id = %conn.id(),
                    "Typing relay skipped dead connection"
                );
            }
        }

        tracing::trace!(
            sender_id = %sender.id,
            is_typing,
            sent,
            "Typing signal relayed"
        );
        sent
    }

    /// Relay a read receipt to the original sender's connections
    ///
    /// The reader's authorization to read the message is checked before the
    /// relay is invoked; the relay itself only addresses and emits.
    pub async fn relay_read_receipt(
        &self,
        reader_id: PrincipalId,
        message_id: MessageId,
        original_sender_id: PrincipalId,
    ) -> usize {
        let event = ServerEvent::MessageReadReceipt {
            message_id,
            reader_id,
            read_at: Utc::now(),
        };

        let mut sent = 0;
        for conn in self.registry.connections_for(original_sender_id) {
            if conn.send(event.clone()).await.is_ok() {
                sent += 1;
            } else {
                tracing::trace!(
                    connection_id = %conn.id(),
                    "Read receipt skipped dead connection"
                );
            }
        }

        tracing::trace!(
            message_id = %message_id,
            reader_id = %reader_id,
            sent,
            "Read receipt relayed"
        );
        sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{connected, drain, names};

    fn summary(id: PrincipalId) -> SenderSummary {
        SenderSummary {
            id,
            handle: "ada".to_string(),
            display_name: "Ada".to_string(),
        }
    }

    fn setup() -> (Arc<ConnectionRegistry>, Arc<ChannelRouter>, SignalRelay) {
        let registry = ConnectionRegistry::new_shared();
        let router = Arc::new(ChannelRouter::new(registry.clone()));
        let relay = SignalRelay::new(registry.clone(), router.clone());
        (registry, router, relay)
    }

    #[tokio::test]
    async fn test_room_typing_excludes_sender() {
        let (registry, router, relay) = setup();
        let room_id = RoomId::generate();
        let channel = Channel::room(room_id);
        let sender = PrincipalId::generate();
        let other = PrincipalId::generate();

        let (sender_conn, mut sender_rx) = connected(&registry, sender);
        let (other_conn, mut other_rx) = connected(&registry, other);
        router.subscribe(sender_conn.id(), channel).await.unwrap();
        router.subscribe(other_conn.id(), channel).await.unwrap();

        let sent = relay
            .relay_typing(&summary(sender), TypingTarget::Room(room_id), true)
            .await;

        assert_eq!(sent, 1);
        assert_eq!(names(&drain(&mut other_rx)), vec!["user_typing"]);
        assert!(drain(&mut sender_rx).is_empty());
    }

    #[tokio::test]
    async fn test_direct_typing_stop_reaches_all_receiver_devices() {
        let (registry, _router, relay) = setup();
        let sender = PrincipalId::generate();
        let receiver = PrincipalId::generate();

        let (_a, mut a_rx) = connected(&registry, receiver);
        let (_b, mut b_rx) = connected(&registry, receiver);

        let sent = relay
            .relay_typing(&summary(sender), TypingTarget::Receiver(receiver), false)
            .await;

        assert_eq!(sent, 2);
        assert_eq!(names(&drain(&mut a_rx)), vec!["user_stopped_typing"]);
        assert_eq!(names(&drain(&mut b_rx)), vec!["user_stopped_typing"]);
    }

    #[tokio::test]
    async fn test_typing_to_empty_target_is_zero_deliveries() {
        let (_registry, _router, relay) = setup();
        let sent = relay
            .relay_typing(
                &summary(PrincipalId::generate()),
                TypingTarget::Receiver(PrincipalId::generate()),
                true,
            )
            .await;
        assert_eq!(sent, 0);
    }

    #[tokio::test]
    async fn test_read_receipt_addresses_original_sender() {
        let (registry, _router, relay) = setup();
        let reader = PrincipalId::generate();
        let original_sender = PrincipalId::generate();
        let message_id = MessageId::generate();

        let (_conn, mut rx) = connected(&registry, original_sender);

        let sent = relay
            .relay_read_receipt(reader, message_id, original_sender)
            .await;

        assert_eq!(sent, 1);
        let events = drain(&mut rx);
        assert!(matches!(
            events[0],
            ServerEvent::MessageReadReceipt {
                message_id: m,
                reader_id: r,
                ..
            } if m == message_id && r == reader
        ));
    }
}
