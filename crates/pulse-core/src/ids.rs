//! Opaque identifiers for principals, connections, rooms, and messages.
//!
//! All ids are UUID-backed and serialize as their hyphenated string form
//! (JavaScript clients never see raw bytes or integers).

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Error when parsing an id from a string
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IdParseError {
    #[error("invalid id format")]
    InvalidFormat,
}

macro_rules! define_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create from an existing UUID
            #[inline]
            #[must_use]
            pub const fn new(id: Uuid) -> Self {
                Self(id)
            }

            /// Generate a fresh random id
            #[must_use]
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            /// Get the inner UUID
            #[inline]
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }

            /// Parse from string representation
            pub fn parse(s: &str) -> Result<Self, IdParseError> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|_| IdParseError::InvalidFormat)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

define_id! {
    /// Stable identity of an authenticated user
    PrincipalId
}

define_id! {
    /// One live transport session, unique per connection lifetime
    ConnectionId
}

define_id! {
    /// A chat room
    RoomId
}

define_id! {
    /// A persisted message record
    MessageId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_unique() {
        let a = ConnectionId::generate();
        let b = ConnectionId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_parse_roundtrip() {
        let id = PrincipalId::generate();
        let parsed = PrincipalId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(RoomId::parse("not-a-uuid"), Err(IdParseError::InvalidFormat));
    }

    #[test]
    fn test_serialize_as_string() {
        let id = MessageId::new(Uuid::nil());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000000\"");
    }

    #[test]
    fn test_deserialize_from_string() {
        let id: PrincipalId =
            serde_json::from_str("\"00000000-0000-0000-0000-000000000000\"").unwrap();
        assert_eq!(id.into_inner(), Uuid::nil());
    }

    #[test]
    fn test_from_str() {
        let id = ConnectionId::generate();
        let parsed: ConnectionId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }
}
