//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::ids::{ConnectionId, MessageId, PrincipalId, RoomId};

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Connection already registered: {0}")]
    DuplicateConnection(ConnectionId),

    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Unknown connection: {0}")]
    UnknownConnection(ConnectionId),

    #[error("Principal not found: {0}")]
    PrincipalNotFound(PrincipalId),

    #[error("Room not found: {0}")]
    RoomNotFound(RoomId),

    #[error("Message not found: {0}")]
    MessageNotFound(MessageId),

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Not a member of room {0}")]
    NotRoomMember(RoomId),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Content too long: max {max} characters")]
    ContentTooLong { max: usize },

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for client-facing payloads
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateConnection(_) => "DUPLICATE_CONNECTION",
            Self::UnknownConnection(_) => "UNKNOWN_CONNECTION",
            Self::PrincipalNotFound(_) => "UNKNOWN_USER",
            Self::RoomNotFound(_) => "UNKNOWN_ROOM",
            Self::MessageNotFound(_) => "UNKNOWN_MESSAGE",
            Self::NotRoomMember(_) => "NOT_ROOM_MEMBER",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::ContentTooLong { .. } => "CONTENT_TOO_LONG",
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UnknownConnection(_)
                | Self::PrincipalNotFound(_)
                | Self::RoomNotFound(_)
                | Self::MessageNotFound(_)
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::DuplicateConnection(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError(_) | Self::ContentTooLong { .. })
    }

    /// Check if this failure came from the persistence layer
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::DatabaseError(_))
    }
}
