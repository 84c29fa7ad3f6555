//! Handler error types

use thiserror::Error;

use pulse_core::DomainError;

use crate::protocol::CloseCode;

/// Handler error type
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Invalid payload received
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Domain error (from the core or repositories)
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HandlerError {
    /// Convert to a close code, if this error should end the connection
    ///
    /// Not-found errors are local and recovered (the operation becomes a
    /// no-op); everything else closes the socket.
    pub fn to_close_code(&self) -> Option<CloseCode> {
        match self {
            Self::InvalidPayload(_) => Some(CloseCode::DecodeError),
            Self::Domain(e) if e.is_not_found() => None,
            Self::Domain(_) | Self::Internal(_) => Some(CloseCode::UnknownError),
        }
    }
}

/// Handler result type
pub type HandlerResult<T> = Result<T, HandlerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::ConnectionId;

    #[test]
    fn test_invalid_payload_closes_with_decode_error() {
        let err = HandlerError::InvalidPayload("bad".to_string());
        assert_eq!(err.to_close_code(), Some(CloseCode::DecodeError));
    }

    #[test]
    fn test_not_found_is_recoverable() {
        let err = HandlerError::from(DomainError::UnknownConnection(ConnectionId::generate()));
        assert_eq!(err.to_close_code(), None);
    }

    #[test]
    fn test_other_domain_errors_close() {
        let err = HandlerError::from(DomainError::DatabaseError("down".to_string()));
        assert_eq!(err.to_close_code(), Some(CloseCode::UnknownError));
    }
}
