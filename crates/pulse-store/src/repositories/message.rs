//! PostgreSQL implementation of MessageRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use pulse_core::{
    DomainError, MessageId, MessageRecord, MessageRepository, MessageTarget, NewMessage,
    PrincipalId, RepoResult,
};

use crate::models::MessageModel;

use super::error::{map_db_error, map_fk_violation};

/// PostgreSQL implementation of MessageRepository
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    /// Create a new PgMessageRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    #[instrument(skip(self, message), fields(sender_id = %message.sender_id))]
    async fn create(&self, message: &NewMessage) -> RepoResult<MessageRecord> {
        let (receiver_id, room_id) = match message.target {
            MessageTarget::Direct { receiver_id } => (Some(receiver_id.into_inner()), None),
            MessageTarget::Room { room_id } => (None, Some(room_id.into_inner())),
        };

        // Insert and read back the persisted row with the sender identity in
        // a single round trip. The id and timestamp are assigned here.
        let row = sqlx::query_as::<_, MessageModel>(
            r#"
            WITH inserted AS (
                INSERT INTO messages (sender_id, receiver_id, room_id, content)
                VALUES ($1, $2, $3, $4)
                RETURNING id, sender_id, receiver_id, room_id, content, created_at, is_read
            )
            SELECT i.id, i.sender_id, i.receiver_id, i.room_id, i.content,
                   i.created_at, i.is_read,
                   p.handle AS sender_handle, p.display_name AS sender_display_name
            FROM inserted i
            JOIN principals p ON p.id = i.sender_id
            "#,
        )
        .bind(message.sender_id.into_inner())
        .bind(receiver_id)
        .bind(room_id)
        .bind(&message.content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_fk_violation(e, || match message.target {
                MessageTarget::Direct { receiver_id } => {
                    DomainError::PrincipalNotFound(receiver_id)
                }
                MessageTarget::Room { room_id } => DomainError::RoomNotFound(room_id),
            })
        })?;

        MessageRecord::try_from(row)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: MessageId) -> RepoResult<Option<MessageRecord>> {
        let row = sqlx::query_as::<_, MessageModel>(
            r#"
            SELECT m.id, m.sender_id, m.receiver_id, m.room_id, m.content,
                   m.created_at, m.is_read,
                   p.handle AS sender_handle, p.display_name AS sender_display_name
            FROM messages m
            JOIN principals p ON p.id = m.sender_id
            WHERE m.id = $1
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.map(MessageRecord::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn mark_read(&self, id: MessageId, reader_id: PrincipalId) -> RepoResult<bool> {
        // Only the addressed receiver of an unread direct message may flip
        // the flag; everything else matches zero rows.
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET is_read = TRUE
            WHERE id = $1 AND receiver_id = $2 AND is_read = FALSE
            "#,
        )
        .bind(id.into_inner())
        .bind(reader_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
