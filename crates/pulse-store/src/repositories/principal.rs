//! PostgreSQL implementation of PrincipalRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use pulse_core::{Principal, PrincipalId, PrincipalRepository, RepoResult};

use crate::models::PrincipalModel;

use super::error::map_db_error;

/// PostgreSQL implementation of PrincipalRepository
#[derive(Clone)]
pub struct PgPrincipalRepository {
    pool: PgPool,
}

impl PgPrincipalRepository {
    /// Create a new PgPrincipalRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PrincipalRepository for PgPrincipalRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: PrincipalId) -> RepoResult<Option<Principal>> {
        let result = sqlx::query_as::<_, PrincipalModel>(
            r#"
            SELECT id, handle, display_name, is_online, last_seen
            FROM principals
            WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Principal::from))
    }

    #[instrument(skip(self))]
    async fn set_presence(
        &self,
        id: PrincipalId,
        online: bool,
        last_seen: DateTime<Utc>,
    ) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE principals
            SET is_online = $2, last_seen = $3
            WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .bind(online)
        .bind(last_seen)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(pulse_core::DomainError::PrincipalNotFound(id));
        }

        Ok(())
    }
}
