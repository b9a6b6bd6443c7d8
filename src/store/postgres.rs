//! PostgreSQL implementation of [`ApiKeyTable`] on top of sqlx.

use async_trait::async_trait;
use uuid::Uuid;

use super::{ApiKeyPatch, ApiKeyTable, NewApiKey, SelectFilter};
use crate::{db::DbPool, error::AppError, models::api_key::ApiKeyRecord};

const COLUMNS: &str = "id, name, description, permissions, usage_limit, api_key, \
                       is_active, created_at, last_used, user_id";

/// `api_keys` table accessed through a shared connection pool.
#[derive(Debug, Clone)]
pub struct PgApiKeyTable {
    pool: DbPool,
}

impl PgApiKeyTable {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map a unique violation on insert to a collision the caller can retry.
fn map_insert_error(err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::KeyCollision
        }
        other => AppError::Database(other),
    }
}

#[async_trait]
impl ApiKeyTable for PgApiKeyTable {
    async fn select(&self, filter: &SelectFilter) -> Result<Vec<ApiKeyRecord>, AppError> {
        // NULL parameters disable their predicate
        let rows = sqlx::query_as::<_, ApiKeyRecord>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM api_keys
            WHERE ($1::uuid IS NULL OR user_id = $1)
              AND ($2::text IS NULL OR api_key = $2)
              AND (NOT $3 OR is_active = true)
            ORDER BY created_at DESC
            "#
        ))
        .bind(filter.user_id)
        .bind(filter.api_key.as_deref())
        .bind(filter.active_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn insert(&self, new_key: NewApiKey) -> Result<ApiKeyRecord, AppError> {
        sqlx::query_as::<_, ApiKeyRecord>(&format!(
            r#"
            INSERT INTO api_keys (name, description, permissions, usage_limit, api_key, is_active, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(new_key.name)
        .bind(new_key.description)
        .bind(new_key.permissions)
        .bind(new_key.usage_limit)
        .bind(new_key.api_key)
        .bind(new_key.is_active)
        .bind(new_key.user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)
    }

    async fn update(
        &self,
        id: Uuid,
        patch: ApiKeyPatch,
    ) -> Result<Option<ApiKeyRecord>, AppError> {
        let record = sqlx::query_as::<_, ApiKeyRecord>(&format!(
            r#"
            UPDATE api_keys
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                permissions = COALESCE($4, permissions),
                usage_limit = COALESCE($5, usage_limit),
                is_active = COALESCE($6, is_active),
                last_used = COALESCE($7, last_used)
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.name)
        .bind(patch.description)
        .bind(patch.permissions)
        .bind(patch.usage_limit)
        .bind(patch.is_active)
        .bind(patch.last_used)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM api_keys WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
