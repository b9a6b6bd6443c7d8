//! Key store - the single source of truth for API key records.
//!
//! This service handles:
//! - Listing keys, optionally for one owner, newest first
//! - Creating keys with generated `api_key` values and defaults applied
//! - Partial updates of the four mutable fields
//! - Activation status and last-used bookkeeping
//!
//! Each operation is one request to the [`ApiKeyTable`]. There is no
//! optimistic concurrency check: concurrent writers to the same row race
//! and the last write wins.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::api_key::{ApiKeyRecord, DEFAULT_USAGE_LIMIT, Permission},
    services::key_generator::KeyGenerator,
    store::{ApiKeyPatch, ApiKeyTable, NewApiKey, SelectFilter},
};

/// Default budget of fresh keys tried when an insert collides.
pub const DEFAULT_KEY_GENERATION_ATTEMPTS: u32 = 3;

/// Caller-controlled fields of a new key.
#[derive(Debug, Clone, Default)]
pub struct NewKeyFields {
    pub name: String,
    pub description: Option<String>,
    pub permissions: Option<Permission>,
    pub usage_limit: Option<i32>,
}

/// Changes to the mutable fields of an existing key.
#[derive(Debug, Clone, Default)]
pub struct KeyChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub permissions: Option<Permission>,
    pub usage_limit: Option<i32>,
}

/// CRUD and status operations over the `api_keys` table.
pub struct KeyStore {
    table: Arc<dyn ApiKeyTable>,
    generator: KeyGenerator,
    max_attempts: u32,
}

impl KeyStore {
    pub fn new(table: Arc<dyn ApiKeyTable>, generator: KeyGenerator) -> Self {
        Self {
            table,
            generator,
            max_attempts: DEFAULT_KEY_GENERATION_ATTEMPTS,
        }
    }

    /// Set how many generated keys `create` tries before giving up.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// List keys newest first, restricted to `owner` when given.
    pub async fn list(&self, owner: Option<Uuid>) -> Result<Vec<ApiKeyRecord>, AppError> {
        self.table.select(&SelectFilter::owned_by(owner)).await
    }

    /// Create a key with a freshly generated `api_key`.
    ///
    /// # Errors
    ///
    /// - `Validation`: name is blank or usage limit is negative
    /// - `KeyCollision`: every generated key collided with an existing one
    /// - `Database`: the insert failed
    pub async fn create(
        &self,
        fields: NewKeyFields,
        owner: Option<Uuid>,
    ) -> Result<ApiKeyRecord, AppError> {
        let name = required_name(&fields.name)?;
        let usage_limit = checked_usage_limit(fields.usage_limit)?.unwrap_or(DEFAULT_USAGE_LIMIT);

        let mut attempt = 1;
        loop {
            let new_key = NewApiKey {
                name: name.clone(),
                description: fields.description.clone().unwrap_or_default(),
                permissions: fields.permissions.unwrap_or_default().as_str().to_string(),
                usage_limit,
                api_key: self.generator.generate(),
                is_active: true,
                user_id: owner,
            };

            match self.table.insert(new_key).await {
                Ok(record) => {
                    tracing::info!("API key created: id={}", record.id);
                    return Ok(record);
                }
                Err(AppError::KeyCollision) if attempt < self.max_attempts => {
                    tracing::warn!(
                        "Generated API key collided (attempt {}/{}), regenerating",
                        attempt,
                        self.max_attempts
                    );
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Update name, description, permissions and/or usage limit.
    ///
    /// `id`, `api_key` and `created_at` are never touched.
    pub async fn update(&self, id: Uuid, changes: KeyChanges) -> Result<ApiKeyRecord, AppError> {
        let name = changes.name.as_deref().map(required_name).transpose()?;
        let patch = ApiKeyPatch {
            name,
            description: changes.description,
            permissions: changes.permissions.map(|p| p.as_str().to_string()),
            usage_limit: checked_usage_limit(changes.usage_limit)?,
            ..ApiKeyPatch::default()
        };

        let record = self.apply(id, patch).await?;
        tracing::info!("API key updated: id={}", id);
        Ok(record)
    }

    /// Delete a key. Deleting an id that does not exist succeeds.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.table.delete(id).await?;
        tracing::info!("API key deleted: id={}", id);
        Ok(())
    }

    /// Activate or deactivate a key.
    pub async fn set_active(&self, id: Uuid, is_active: bool) -> Result<ApiKeyRecord, AppError> {
        let patch = ApiKeyPatch {
            is_active: Some(is_active),
            ..ApiKeyPatch::default()
        };

        let record = self.apply(id, patch).await?;
        tracing::info!("API key id={} is_active={}", id, is_active);
        Ok(record)
    }

    /// Stamp `last_used` with the current time.
    pub async fn touch_last_used(&self, id: Uuid) -> Result<ApiKeyRecord, AppError> {
        let patch = ApiKeyPatch {
            last_used: Some(Utc::now()),
            ..ApiKeyPatch::default()
        };

        self.apply(id, patch).await
    }

    /// The active record holding exactly `api_key`, if any.
    pub async fn find_active(&self, api_key: &str) -> Result<Option<ApiKeyRecord>, AppError> {
        let mut rows = self.table.select(&SelectFilter::active_key(api_key)).await?;
        Ok(rows.pop())
    }

    /// Check that the backing table is reachable.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.table.ping().await
    }

    async fn apply(&self, id: Uuid, patch: ApiKeyPatch) -> Result<ApiKeyRecord, AppError> {
        self.table
            .update(id, patch)
            .await?
            .ok_or(AppError::ApiKeyNotFound)
    }
}

fn required_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation("Name is required"));
    }
    Ok(name.to_string())
}

fn checked_usage_limit(limit: Option<i32>) -> Result<Option<i32>, AppError> {
    match limit {
        Some(n) if n < 0 => Err(AppError::validation("Usage limit must not be negative")),
        other => Ok(other),
    }
}
