//! PostgreSQL implementation of RoomRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use pulse_core::{PrincipalId, RepoResult, RoomId, RoomRepository};

use super::error::map_db_error;

/// PostgreSQL implementation of RoomRepository
#[derive(Clone)]
pub struct PgRoomRepository {
    pool: PgPool,
}

impl PgRoomRepository {
    /// Create a new PgRoomRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoomRepository for PgRoomRepository {
    #[instrument(skip(self))]
    async fn is_member(&self, room_id: RoomId, principal_id: PrincipalId) -> RepoResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM room_members
                WHERE room_id = $1 AND principal_id = $2
            )
            "#,
        )
        .bind(room_id.into_inner())
        .bind(principal_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(exists)
    }

    #[instrument(skip(self))]
    async fn member_ids(&self, room_id: RoomId) -> RepoResult<Vec<PrincipalId>> {
        let rows = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT principal_id FROM room_members
            WHERE room_id = $1
            "#,
        )
        .bind(room_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(PrincipalId::new).collect())
    }
}
