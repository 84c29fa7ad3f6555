//! Channel addressing.
//!
//! A channel is a logical broadcast target: either a principal's private
//! inbox (DMs and notifications) or a room topic. The original system
//! addressed these by string convention (`user_<id>` / `room_<id>`); here
//! the two kinds are a first-class enum so routing is a total function.

use crate::ids::{PrincipalId, RoomId};

/// Wire-name prefix for private inbox channels
pub const INBOX_CHANNEL_PREFIX: &str = "user:";
/// Wire-name prefix for room topic channels
pub const ROOM_CHANNEL_PREFIX: &str = "room:";

/// A logical broadcast target
///
/// Inbox channels implicitly exist for every principal. Room channels are
/// addressed by room id; their lifetime is tied to the room entity in the
/// persistence layer, not to subscription count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// A principal's private inbox (DMs, notifications)
    Inbox(PrincipalId),
    /// A room topic
    Room(RoomId),
}

impl Channel {
    /// Create an inbox channel
    #[must_use]
    pub fn inbox(principal_id: PrincipalId) -> Self {
        Self::Inbox(principal_id)
    }

    /// Create a room channel
    #[must_use]
    pub fn room(room_id: RoomId) -> Self {
        Self::Room(room_id)
    }

    /// Get the deterministic channel name
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Inbox(id) => format!("{INBOX_CHANNEL_PREFIX}{id}"),
            Self::Room(id) => format!("{ROOM_CHANNEL_PREFIX}{id}"),
        }
    }

    /// Parse a channel name back to a `Channel`
    ///
    /// Returns `None` for names that match neither prefix or carry a
    /// malformed id.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        if let Some(id_str) = name.strip_prefix(INBOX_CHANNEL_PREFIX) {
            return PrincipalId::parse(id_str).ok().map(Self::Inbox);
        }

        if let Some(id_str) = name.strip_prefix(ROOM_CHANNEL_PREFIX) {
            return RoomId::parse(id_str).ok().map(Self::Room);
        }

        None
    }

    /// Check if this is a private inbox channel
    #[must_use]
    pub fn is_inbox(&self) -> bool {
        matches!(self, Self::Inbox(_))
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
