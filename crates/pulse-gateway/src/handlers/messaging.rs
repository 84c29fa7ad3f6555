//! Message send handlers
//!
//! The critical path: validate, authorize, persist, then fan out. Fan-out
//! strictly follows the acknowledged durable write; a persistence failure
//! surfaces as an explicit rejection event to the sender and nothing is
//! delivered anywhere.

use std::sync::Arc;

use validator::Validate;

use pulse_core::{MessageTarget, NewMessage};
use pulse_engine::Connection;

use crate::protocol::{CloseCode, RoomMessagePayload, SendDirectMessagePayload};
use crate::server::GatewayState;

use super::{reject, HandlerResult};

/// Handles room and direct message sends
pub struct MessagingHandler;

impl MessagingHandler {
    /// Handle a send_room_message event
    pub async fn send_room(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: RoomMessagePayload,
    ) -> HandlerResult<Option<CloseCode>> {
        if let Err(e) = payload.validate() {
            reject(connection, "VALIDATION_ERROR", e.to_string()).await;
            return Ok(None);
        }

        let principal_id = connection.principal_id();
        match state.rooms().is_member(payload.room_id, principal_id).await {
            Ok(true) => {}
            Ok(false) => {
                reject(connection, "NOT_ROOM_MEMBER", "Not a member of this room").await;
                return Ok(None);
            }
            Err(e) => {
                tracing::error!(error = %e, "Membership check failed");
                reject(connection, e.code(), "Could not verify room membership").await;
                return Ok(None);
            }
        }

        let target = MessageTarget::room(payload.room_id);
        Self::persist_and_deliver(state, connection, target, payload.content).await
    }

    /// Handle a send_direct_message event
    pub async fn send_direct(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: SendDirectMessagePayload,
    ) -> HandlerResult<Option<CloseCode>> {
        if let Err(e) = payload.validate() {
            reject(connection, "VALIDATION_ERROR", e.to_string()).await;
            return Ok(None);
        }

        let target = MessageTarget::direct(payload.receiver_id);
        Self::persist_and_deliver(state, connection, target, payload.content).await
    }

    async fn persist_and_deliver(
        state: &GatewayState,
        connection: &Arc<Connection>,
        target: MessageTarget,
        content: String,
    ) -> HandlerResult<Option<CloseCode>> {
        let message = match NewMessage::new(connection.principal_id(), target, content) {
            Ok(m) => m,
            Err(e) => {
                reject(connection, e.code(), e.to_string()).await;
                return Ok(None);
            }
        };

        // Durable write first; nothing is emitted for an unpersisted message
        let record = match state.messages().create(&message).await {
            Ok(record) => record,
            Err(e) => {
                tracing::error!(
                    connection_id = %connection.id(),
                    error = %e,
                    "Message persistence failed; no fan-out"
                );
                reject(connection, e.code(), "Message could not be saved").await;
                return Ok(None);
            }
        };

        let report = state.hub().fanout().deliver(&record).await;
        tracing::debug!(
            message_id = %record.id,
            delivered = report.delivered,
            failed = report.failed,
            "Message delivered"
        );

        Ok(None)
    }
}
