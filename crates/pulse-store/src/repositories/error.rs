//! Error handling utilities for repositories

use pulse_core::DomainError;
use sqlx::Error as SqlxError;

/// Convert a SQLx error to a DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Check for a foreign-key violation and return the given error, or fall
/// back to a database error
pub fn map_fk_violation<F>(e: SqlxError, on_fk: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_foreign_key_violation() {
            return on_fk();
        }
    }
    DomainError::DatabaseError(e.to_string())
}
