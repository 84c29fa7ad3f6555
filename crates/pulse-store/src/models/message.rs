//! Message database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for the messages table, joined with the sender's identity
///
/// Exactly one of `receiver_id` and `room_id` is non-null; the table enforces
/// this with a check constraint. Every message query joins the principals
/// table so delivered records carry a populated sender without a second
/// lookup.
#[derive(Debug, Clone, FromRow)]
pub struct MessageModel {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
    pub sender_handle: String,
    pub sender_display_name: String,
}

impl MessageModel {
    /// Check if this row is a direct message
    #[inline]
    pub fn is_direct(&self) -> bool {
        self.receiver_id.is_some()
    }
}
