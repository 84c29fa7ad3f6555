//! Events emitted by the core to connected clients.
//!
//! Wire format is `{"event": "<name>", "data": {...}}` with snake_case
//! event names matching what the browser client listens for.

use crate::entities::{MessageRecord, SenderSummary};
use crate::ids::{MessageId, PrincipalId, RoomId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a room-activity notification was raised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityCause {
    /// A new message was persisted in the room
    NewMessage,
}

/// Every event the core can push to a client connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// A direct message addressed to this principal
    NewDirectMessage(MessageRecord),
    /// A message in a room this connection is subscribed to
    NewRoomMessage(MessageRecord),
    /// Confirmation to the sender's own connections that a message was
    /// persisted and fanned out (distinct from the delivery events)
    MessageSent(MessageRecord),
    /// The durable write for a submitted message failed; nothing was
    /// delivered and the client must retry manually
    MessageRejected {
        code: String,
        reason: String,
    },
    /// Lightweight unread-counter hint to room members not viewing the room
    RoomActivity {
        room_id: RoomId,
        cause: ActivityCause,
    },
    /// Someone started typing in a shared context
    UserTyping {
        user: SenderSummary,
        #[serde(skip_serializing_if = "Option::is_none")]
        room_id: Option<RoomId>,
    },
    /// Typing stopped (explicit stop only; staleness is a client concern)
    UserStoppedTyping {
        user_id: PrincipalId,
        #[serde(skip_serializing_if = "Option::is_none")]
        room_id: Option<RoomId>,
    },
    /// A message this principal sent was read
    MessageReadReceipt {
        message_id: MessageId,
        reader_id: PrincipalId,
        read_at: DateTime<Utc>,
    },
    /// A principal came online (first connection)
    UserOnline { user_id: PrincipalId },
    /// A principal went offline (last connection closed)
    UserOffline {
        user_id: PrincipalId,
        last_seen: DateTime<Utc>,
    },
    /// Another subscriber joined a room channel
    RoomJoined {
        room_id: RoomId,
        user: SenderSummary,
    },
    /// A subscriber left a room channel
    RoomLeft {
        room_id: RoomId,
        user_id: PrincipalId,
    },
}

impl ServerEvent {
    /// Wire name of the event, for logging
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NewDirectMessage(_) => "new_direct_message",
            Self::NewRoomMessage(_) => "new_room_message",
            Self::MessageSent(_) => "message_sent",
            Self::MessageRejected { .. } => "message_rejected",
            Self::RoomActivity { .. } => "room_activity",
            Self::UserTyping { .. } => "user_typing",
            Self::UserStoppedTyping { .. } => "user_stopped_typing",
            Self::MessageReadReceipt { .. } => "message_read_receipt",
            Self::UserOnline { .. } => "user_online",
            Self::UserOffline { .. } => "user_offline",
            Self::RoomJoined { .. } => "room_joined",
            Self::RoomLeft { .. } => "room_left",
        }
    }

    /// Serialize to the wire JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl std::fmt::Display for ServerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
