//! Room join/leave handlers
//!
//! Membership authorization is consulted here, once, before the router is
//! touched; the router itself stays a pure pub/sub primitive.

use std::sync::Arc;

use pulse_core::{Channel, ServerEvent};
use pulse_engine::Connection;

use crate::protocol::{CloseCode, RoomPayload};
use crate::server::GatewayState;

use super::{sender_summary, HandlerResult};

/// Handles room channel subscriptions
pub struct MembershipHandler;

impl MembershipHandler {
    /// Handle a join_room event
    pub async fn join(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: RoomPayload,
    ) -> HandlerResult<Option<CloseCode>> {
        let room_id = payload.room_id;
        let principal_id = connection.principal_id();

        if !state.rooms().is_member(room_id, principal_id).await? {
            tracing::warn!(
                connection_id = %connection.id(),
                principal_id = %principal_id,
                room_id = %room_id,
                "Join refused: not a room member"
            );
            return Ok(None);
        }

        let user = sender_summary(state, connection).await?;
        let channel = Channel::room(room_id);
        state.hub().router().subscribe(connection.id(), channel).await?;

        // Notify the other subscribers, not the joining connection
        let event = ServerEvent::RoomJoined { room_id, user };
        for conn in state.hub().router().subscribers_of(channel) {
            if conn.id() == connection.id() {
                continue;
            }
            conn.send(event.clone()).await.ok();
        }

        tracing::debug!(
            connection_id = %connection.id(),
            room_id = %room_id,
            "Joined room channel"
        );
        Ok(None)
    }

    /// Handle a leave_room event
    pub async fn leave(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: RoomPayload,
    ) -> HandlerResult<Option<CloseCode>> {
        let room_id = payload.room_id;
        let channel = Channel::room(room_id);

        state
            .hub()
            .router()
            .unsubscribe(connection.id(), channel)
            .await?;

        let event = ServerEvent::RoomLeft {
            room_id,
            user_id: connection.principal_id(),
        };
        for conn in state.hub().router().subscribers_of(channel) {
            if conn.id() == connection.id() {
                continue;
            }
            conn.send(event.clone()).await.ok();
        }

        tracing::debug!(
            connection_id = %connection.id(),
            room_id = %room_id,
            "Left room channel"
        );
        Ok(None)
    }
}
