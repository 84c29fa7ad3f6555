//! Message entities
//!
//! A message is addressed to exactly one target: a receiving principal
//! (direct message) or a room. The exclusive-or is encoded in the type, not
//! in a pair of nullable columns.

use crate::channel::Channel;
use crate::entities::SenderSummary;
use crate::error::DomainError;
use crate::ids::{MessageId, PrincipalId, RoomId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum message content length in characters
pub const MAX_CONTENT_LENGTH: usize = 2000;

/// The single delivery target of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageTarget {
    /// Direct message to one principal
    Direct {
        /// Receiving principal
        receiver_id: PrincipalId,
    },
    /// Message into a room topic
    Room {
        /// Target room
        room_id: RoomId,
    },
}

impl MessageTarget {
    /// Create a direct-message target
    #[must_use]
    pub fn direct(receiver_id: PrincipalId) -> Self {
        Self::Direct { receiver_id }
    }

    /// Create a room target
    #[must_use]
    pub fn room(room_id: RoomId) -> Self {
        Self::Room { room_id }
    }

    /// The broadcast channel this target resolves to
    #[must_use]
    pub fn channel(&self) -> Channel {
        match *self {
            Self::Direct { receiver_id } => Channel::inbox(receiver_id),
            Self::Room { room_id } => Channel::room(room_id),
        }
    }

    /// Room id, if this is a room target
    #[must_use]
    pub fn room_id(&self) -> Option<RoomId> {
        match *self {
            Self::Room { room_id } => Some(room_id),
            Self::Direct { .. } => None,
        }
    }

    /// Receiver id, if this is a direct target
    #[must_use]
    pub fn receiver_id(&self) -> Option<PrincipalId> {
        match *self {
            Self::Direct { receiver_id } => Some(receiver_id),
            Self::Room { .. } => None,
        }
    }
}

/// A message submitted for durable append, before persistence assigns
/// identity and timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    /// Sending principal
    pub sender_id: PrincipalId,
    /// Delivery target
    pub target: MessageTarget,
    /// Message body
    pub content: String,
}

impl NewMessage {
    /// Build a new message, validating the content
    pub fn new(
        sender_id: PrincipalId,
        target: MessageTarget,
        content: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let content = content.into();

        if content.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "message content must not be empty".to_string(),
            ));
        }
        if content.chars().count() > MAX_CONTENT_LENGTH {
            return Err(DomainError::ContentTooLong {
                max: MAX_CONTENT_LENGTH,
            });
        }

        Ok(Self {
            sender_id,
            target,
            content,
        })
    }
}

/// A durably persisted message, as delivered to clients
///
/// The sender is embedded as a populated summary so receivers can render
/// the message without a profile lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Unique message id
    pub id: MessageId,
    /// Populated sender identity
    pub sender: SenderSummary,
    /// Delivery target (serialized as `receiver_id` or `room_id`)
    #[serde(flatten)]
    pub target: MessageTarget,
    /// Message body
    pub content: String,
    /// Persistence-assigned creation timestamp (defines conversation order)
    pub created_at: DateTime<Utc>,
    /// Read flag (direct messages only; always false for room messages)
    pub is_read: bool,
}

impl MessageRecord {
    /// The broadcast channel this record is delivered on
    #[must_use]
    pub fn channel(&self) -> Channel {
        self.target.channel()
    }
}
