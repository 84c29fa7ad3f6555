//! Principal database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for the principals table
#[derive(Debug, Clone, FromRow)]
pub struct PrincipalModel {
    pub id: Uuid,
    pub handle: String,
    pub display_name: String,
    pub is_online: bool,
    pub last_seen: Option<DateTime<Utc>>,
}
