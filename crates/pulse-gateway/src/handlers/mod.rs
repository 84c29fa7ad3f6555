//! Client event handlers
//!
//! Incoming events are dispatched by name to a handler per event family.

mod error;
mod membership;
mod messaging;
mod signals;

pub use error::{HandlerError, HandlerResult};
pub use membership::MembershipHandler;
pub use messaging::MessagingHandler;
pub use signals::SignalHandler;

use std::sync::Arc;

use pulse_core::{DomainError, SenderSummary, ServerEvent};
use pulse_engine::Connection;

use crate::protocol::{ClientEvent, CloseCode};
use crate::server::GatewayState;

/// Dispatch incoming client events to the appropriate handlers
pub struct EventDispatcher;

impl EventDispatcher {
    /// Handle an incoming client event
    pub async fn dispatch(
        state: &GatewayState,
        connection: &Arc<Connection>,
        event: ClientEvent,
    ) -> HandlerResult<Option<CloseCode>> {
        tracing::trace!(
            connection_id = %connection.id(),
            event = event.name(),
            "Dispatching client event"
        );

        match event {
            ClientEvent::JoinRoom(payload) => {
                MembershipHandler::join(state, connection, payload).await
            }
            ClientEvent::LeaveRoom(payload) => {
                MembershipHandler::leave(state, connection, payload).await
            }
            ClientEvent::SendRoomMessage(payload) => {
                MessagingHandler::send_room(state, connection, payload).await
            }
            ClientEvent::SendDirectMessage(payload) => {
                MessagingHandler::send_direct(state, connection, payload).await
            }
            ClientEvent::TypingStart(payload) => {
                SignalHandler::typing(state, connection, payload, true).await
            }
            ClientEvent::TypingStop(payload) => {
                SignalHandler::typing(state, connection, payload, false).await
            }
            ClientEvent::MarkRead(payload) => {
                SignalHandler::mark_read(state, connection, payload).await
            }
        }
    }
}

/// Look up the compact identity of the connection's principal
pub(crate) async fn sender_summary(
    state: &GatewayState,
    connection: &Arc<Connection>,
) -> HandlerResult<SenderSummary> {
    let principal_id = connection.principal_id();
    state
        .principals()
        .find_by_id(principal_id)
        .await?
        .map(|p| p.summary())
        .ok_or_else(|| HandlerError::Domain(DomainError::PrincipalNotFound(principal_id)))
}

/// Send a rejection event to the originating connection only
pub(crate) async fn reject(connection: &Arc<Connection>, code: &str, reason: impl Into<String>) {
    let event = ServerEvent::MessageRejected {
        code: code.to_string(),
        reason: reason.into(),
    };
    if connection.send(event).await.is_err() {
        tracing::debug!(
            connection_id = %connection.id(),
            "Could not deliver rejection (connection closed)"
        );
    }
}
