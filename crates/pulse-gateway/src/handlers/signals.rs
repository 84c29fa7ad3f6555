//! Typing and read-receipt handlers
//!
//! Typing signals are never persisted. Read receipts flip the durable read
//! flag first, then relay; a receipt is only relayed when the flag actually
//! changed (right reader, unread direct message).

use std::sync::Arc;

use pulse_engine::{Connection, TypingTarget};

use crate::protocol::{CloseCode, MarkReadPayload, TypingPayload};
use crate::server::GatewayState;

use super::{sender_summary, HandlerError, HandlerResult};

/// Handles ephemeral client signals
pub struct SignalHandler;

impl SignalHandler {
    /// Handle typing_start / typing_stop
    pub async fn typing(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: TypingPayload,
        is_typing: bool,
    ) -> HandlerResult<Option<CloseCode>> {
        if !payload.has_single_target() {
            return Err(HandlerError::InvalidPayload(
                "typing needs exactly one of room_id / receiver_id".to_string(),
            ));
        }

        let target = match (payload.room_id, payload.receiver_id) {
            (Some(room_id), None) => TypingTarget::Room(room_id),
            (None, Some(receiver_id)) => TypingTarget::Receiver(receiver_id),
            _ => unreachable!("single-target checked above"),
        };

        let sender = sender_summary(state, connection).await?;
        state.hub().relay().relay_typing(&sender, target, is_typing).await;

        Ok(None)
    }

    /// Handle mark_read
    pub async fn mark_read(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: MarkReadPayload,
    ) -> HandlerResult<Option<CloseCode>> {
        let reader_id = connection.principal_id();

        let changed = match state
            .messages()
            .mark_read(payload.message_id, reader_id)
            .await
        {
            Ok(changed) => changed,
            Err(e) => {
                tracing::warn!(
                    message_id = %payload.message_id,
                    error = %e,
                    "Read flag write failed; receipt dropped"
                );
                return Ok(None);
            }
        };

        if !changed {
            tracing::debug!(
                message_id = %payload.message_id,
                reader_id = %reader_id,
                "mark_read matched nothing; no receipt"
            );
            return Ok(None);
        }

        state
            .hub()
            .relay()
            .relay_read_receipt(reader_id, payload.message_id, payload.sender_id)
            .await;

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{drain, join, names, test_gateway};
    use chrono::Utc;
    use pulse_core::{
        Channel, MessageId, MessageRecord, MessageTarget, PrincipalId, RoomId, SenderSummary,
    };

    #[tokio::test]
    async fn test_typing_requires_single_target() {
        let gw = test_gateway();
        let (conn, _, _rx) = join(&gw, "ada").await;

        let payload = TypingPayload {
            room_id: Some(RoomId::generate()),
            receiver_id: Some(PrincipalId::generate()),
        };
        let err = SignalHandler::typing(&gw.state, &conn, payload, true)
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::InvalidPayload(_)));
    }

    #[tokio::test]
    async fn test_room_typing_excludes_sender() {
        let gw = test_gateway();
        let (sender, _, mut sender_rx) = join(&gw, "ada").await;
        let (member, _, mut member_rx) = join(&gw, "grace").await;

        let room_id = RoomId::generate();
        let channel = Channel::room(room_id);
        let router = gw.state.hub().router();
        router.subscribe(sender.id(), channel).await.unwrap();
        router.subscribe(member.id(), channel).await.unwrap();

        let payload = TypingPayload {
            room_id: Some(room_id),
            receiver_id: None,
        };
        SignalHandler::typing(&gw.state, &sender, payload.clone(), true)
            .await
            .unwrap();
        SignalHandler::typing(&gw.state, &sender, payload, false)
            .await
            .unwrap();

        assert_eq!(
            names(&drain(&mut member_rx)),
            vec!["user_typing", "user_stopped_typing"]
        );
        assert!(drain(&mut sender_rx).is_empty());
    }

    #[tokio::test]
    async fn test_mark_read_relays_to_original_sender() {
        let gw = test_gateway();
        let (_sender, sender_id, mut sender_rx) = join(&gw, "ada").await;
        let (reader, reader_id, mut reader_rx) = join(&gw, "grace").await;

        let message_id = MessageId::generate();
        gw.messages.insert_record(MessageRecord {
            id: message_id,
            sender: SenderSummary {
                id: sender_id,
                handle: "ada".to_string(),
                display_name: "ada".to_string(),
            },
            target: MessageTarget::direct(reader_id),
            content: "hello".to_string(),
            created_at: Utc::now(),
            is_read: false,
        });

        SignalHandler::mark_read(
            &gw.state,
            &reader,
            MarkReadPayload {
                message_id,
                sender_id,
            },
        )
        .await
        .unwrap();

        assert_eq!(names(&drain(&mut sender_rx)), vec!["message_read_receipt"]);
        assert!(drain(&mut reader_rx).is_empty());
    }

    #[tokio::test]
    async fn test_mark_read_by_wrong_reader_emits_nothing() {
        let gw = test_gateway();
        let (_sender, sender_id, mut sender_rx) = join(&gw, "ada").await;
        let (other, _, _) = join(&gw, "grace").await;

        let message_id = MessageId::generate();
        gw.messages.insert_record(MessageRecord {
            id: message_id,
            sender: SenderSummary {
                id: sender_id,
                handle: "ada".to_string(),
                display_name: "ada".to_string(),
            },
            target: MessageTarget::direct(PrincipalId::generate()),
            content: "hello".to_string(),
            created_at: Utc::now(),
            is_read: false,
        });

        SignalHandler::mark_read(
            &gw.state,
            &other,
            MarkReadPayload {
                message_id,
                sender_id,
            },
        )
        .await
        .unwrap();

        assert!(drain(&mut sender_rx).is_empty());
    }
}
