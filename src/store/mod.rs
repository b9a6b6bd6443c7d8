//! Persistence seam for the `api_keys` table.
//!
//! `ApiKeyTable` is the narrow contract the key services depend on: a
//! filtered select, insert-with-returning, update-with-returning and
//! delete-by-id. Every method is a single round-trip; nothing here composes
//! several statements into a transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{error::AppError, models::api_key::ApiKeyRecord};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgApiKeyTable;

/// Row filter for [`ApiKeyTable::select`]. Empty filter selects everything.
#[derive(Debug, Clone, Default)]
pub struct SelectFilter {
    pub user_id: Option<Uuid>,
    pub api_key: Option<String>,
    pub active_only: bool,
}

impl SelectFilter {
    pub fn owned_by(user_id: Option<Uuid>) -> Self {
        Self {
            user_id,
            ..Self::default()
        }
    }

    /// Active record holding exactly this key.
    pub fn active_key(api_key: &str) -> Self {
        Self {
            api_key: Some(api_key.to_string()),
            active_only: true,
            ..Self::default()
        }
    }
}

/// Values for a new row. The table assigns `id` and `created_at`.
#[derive(Debug, Clone)]
pub struct NewApiKey {
    pub name: String,
    pub description: String,
    pub permissions: String,
    pub usage_limit: i32,
    pub api_key: String,
    pub is_active: bool,
    pub user_id: Option<Uuid>,
}

/// Column changes for [`ApiKeyTable::update`]. `None` leaves a column as is.
///
/// There is deliberately no way to change `id`, `api_key` or `created_at`.
#[derive(Debug, Clone, Default)]
pub struct ApiKeyPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub permissions: Option<String>,
    pub usage_limit: Option<i32>,
    pub is_active: Option<bool>,
    pub last_used: Option<DateTime<Utc>>,
}

/// One logical relational table of API keys.
#[async_trait]
pub trait ApiKeyTable: Send + Sync {
    /// Rows matching `filter`, newest first.
    async fn select(&self, filter: &SelectFilter) -> Result<Vec<ApiKeyRecord>, AppError>;

    /// Insert a row and return it as stored.
    ///
    /// A duplicate `api_key` must be reported as [`AppError::KeyCollision`].
    async fn insert(&self, new_key: NewApiKey) -> Result<ApiKeyRecord, AppError>;

    /// Apply `patch` to the row with `id`. `Ok(None)` when no row matched.
    async fn update(&self, id: Uuid, patch: ApiKeyPatch)
    -> Result<Option<ApiKeyRecord>, AppError>;

    /// Delete the row with `id`. Missing rows are not an error.
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;

    /// Cheap connectivity probe.
    async fn ping(&self) -> Result<(), AppError>;
}
