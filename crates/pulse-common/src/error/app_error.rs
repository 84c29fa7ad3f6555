//! Application-level error type
//!
//! Wraps domain errors and adds the infrastructure-facing variants the
//! gateway and store need (auth failures, config, database).

use pulse_core::DomainError;
use thiserror::Error;

/// Result type alias using `AppError`
pub type AppResult<T> = Result<T, AppError>;

/// Top-level application error
#[derive(Debug, Error)]
pub enum AppError {
    // === Authentication ===
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Missing authentication credentials")]
    MissingAuth,

    // === Domain ===
    #[error(transparent)]
    Domain(#[from] DomainError),

    // === Validation ===
    #[error("Validation failed: {0}")]
    Validation(String),

    // === Infrastructure ===
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Machine-readable error code for logging and client payloads
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidToken(_) => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::MissingAuth => "MISSING_AUTH",
            Self::Domain(e) => e.code(),
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether this error indicates an authentication failure
    #[must_use]
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidToken(_) | Self::TokenExpired | Self::MissingAuth
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::TokenExpired.code(), "TOKEN_EXPIRED");
        assert_eq!(AppError::MissingAuth.code(), "MISSING_AUTH");
        assert_eq!(
            AppError::Validation("bad".to_string()).code(),
            "VALIDATION_ERROR"
        );
    }

    #[test]
    fn test_domain_error_code_passthrough() {
        let err = AppError::from(DomainError::UnknownConnection(
            pulse_core::ConnectionId::generate(),
        ));
        assert_eq!(err.code(), "UNKNOWN_CONNECTION");
    }

    #[test]
    fn test_is_auth_error() {
        assert!(AppError::TokenExpired.is_auth_error());
        assert!(AppError::InvalidToken("x".to_string()).is_auth_error());
        assert!(!AppError::Database("down".to_string()).is_auth_error());
    }
}
