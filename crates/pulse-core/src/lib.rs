//! # pulse-core
//!
//! Domain layer for the real-time messaging core: identifiers, channel
//! addressing, entities, server events, and repository traits.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod channel;
pub mod entities;
pub mod error;
pub mod events;
pub mod ids;
pub mod traits;

// Re-export commonly used types at crate root
pub use channel::Channel;
pub use entities::{MessageRecord, MessageTarget, NewMessage, Principal, SenderSummary, MAX_CONTENT_LENGTH};
pub use error::DomainError;
pub use events::{ActivityCause, ServerEvent};
pub use ids::{ConnectionId, IdParseError, MessageId, PrincipalId, RoomId};
pub use traits::{MessageRepository, PrincipalRepository, RepoResult, RoomRepository};
