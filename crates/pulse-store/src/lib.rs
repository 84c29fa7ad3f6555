//! # pulse-store
//!
//! Persistence layer implementing the repository traits from `pulse-core`
//! with PostgreSQL via SQLx.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - Connection pool management
//! - Database models with SQLx `FromRow` derives
//! - Model -> entity mappers
//! - Repository implementations
//!
//! The real-time core only reads what it needs for addressing and
//! authorization and writes messages, read flags, and presence snapshots.

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, PgPool};
pub use repositories::{PgMessageRepository, PgPrincipalRepository, PgRoomRepository};
