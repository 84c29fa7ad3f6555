//! Repository traits (ports) - define the interface for durable state
//!
//! The real-time core defines what it needs from the persistence layer and
//! the infrastructure layer provides the implementation. The core never
//! owns durability: it reacts to acknowledged writes and reads the minimum
//! it needs for addressing and authorization.

use async_trait::async_trait;

use crate::entities::{MessageRecord, NewMessage, Principal};
use crate::error::DomainError;
use crate::ids::{MessageId, PrincipalId, RoomId};
use chrono::{DateTime, Utc};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Principal Repository
// ============================================================================

#[async_trait]
pub trait PrincipalRepository: Send + Sync {
    /// Find a principal by id
    async fn find_by_id(&self, id: PrincipalId) -> RepoResult<Option<Principal>>;

    /// Write the derived presence state
    ///
    /// The core writes exactly these two fields and nothing else on the
    /// principal record.
    async fn set_presence(
        &self,
        id: PrincipalId,
        online: bool,
        last_seen: DateTime<Utc>,
    ) -> RepoResult<()>;
}

// ============================================================================
// Room Repository
// ============================================================================

#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Check whether a principal is a member of a room
    ///
    /// Consulted once, before a room subscribe; the channel router itself
    /// is authorization-agnostic.
    async fn is_member(&self, room_id: RoomId, principal_id: PrincipalId) -> RepoResult<bool>;

    /// All member ids of a room (for room-activity addressing)
    async fn member_ids(&self, room_id: RoomId) -> RepoResult<Vec<PrincipalId>>;
}

// ============================================================================
// Message Repository
// ============================================================================

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Durably append a message and return the persisted record with the
    /// store-assigned id, timestamp, and populated sender summary
    ///
    /// Fan-out must only happen after this returns Ok.
    async fn create(&self, message: &NewMessage) -> RepoResult<MessageRecord>;

    /// Find a message by id
    async fn find_by_id(&self, id: MessageId) -> RepoResult<Option<MessageRecord>>;

    /// Set the read flag on a direct message addressed to `reader_id`
    ///
    /// Returns false if no matching unread message exists (wrong reader,
    /// room message, already read, or unknown id).
    async fn mark_read(&self, id: MessageId, reader_id: PrincipalId) -> RepoResult<bool>;
}
