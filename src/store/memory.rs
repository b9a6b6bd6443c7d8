//! In-memory [`ApiKeyTable`] for tests, with failure injection.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ApiKeyPatch, ApiKeyTable, NewApiKey, SelectFilter};
use crate::{error::AppError, models::api_key::ApiKeyRecord};

#[derive(Debug, Default)]
struct State {
    rows: Vec<ApiKeyRecord>,
    fail_selects: bool,
    fail_updates: bool,
    forced_collisions: usize,
    insert_attempts: usize,
}

/// Mock table backed by a vector.
#[derive(Debug, Clone, Default)]
pub struct MemoryApiKeyTable {
    state: Arc<RwLock<State>>,
}

fn injected_failure() -> AppError {
    AppError::Database(sqlx::Error::Protocol(
        "memory table configured to fail".to_string(),
    ))
}

impl MemoryApiKeyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_fail_selects(&self, fail: bool) {
        self.state.write().await.fail_selects = fail;
    }

    pub async fn set_fail_updates(&self, fail: bool) {
        self.state.write().await.fail_updates = fail;
    }

    /// Report the next `count` inserts as key collisions.
    pub async fn force_collisions(&self, count: usize) {
        self.state.write().await.forced_collisions = count;
    }

    pub async fn insert_attempts(&self) -> usize {
        self.state.read().await.insert_attempts
    }

    pub async fn get(&self, id: Uuid) -> Option<ApiKeyRecord> {
        self.state
            .read()
            .await
            .rows
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }
}

#[async_trait]
impl ApiKeyTable for MemoryApiKeyTable {
    async fn select(&self, filter: &SelectFilter) -> Result<Vec<ApiKeyRecord>, AppError> {
        let state = self.state.read().await;
        if state.fail_selects {
            return Err(injected_failure());
        }

        let mut rows: Vec<ApiKeyRecord> = state
            .rows
            .iter()
            .filter(|r| filter.user_id.is_none() || r.user_id == filter.user_id)
            .filter(|r| {
                filter
                    .api_key
                    .as_deref()
                    .is_none_or(|key| r.api_key == key)
            })
            .filter(|r| !filter.active_only || r.is_active)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(rows)
    }

    async fn insert(&self, new_key: NewApiKey) -> Result<ApiKeyRecord, AppError> {
        let mut state = self.state.write().await;
        state.insert_attempts += 1;

        if state.forced_collisions > 0 {
            state.forced_collisions -= 1;
            return Err(AppError::KeyCollision);
        }
        if state.rows.iter().any(|r| r.api_key == new_key.api_key) {
            return Err(AppError::KeyCollision);
        }

        // Strictly increasing timestamps keep newest-first ordering stable
        let mut created_at = Utc::now();
        if let Some(latest) = state.rows.iter().map(|r| r.created_at).max() {
            if created_at <= latest {
                created_at = latest + Duration::microseconds(1);
            }
        }

        let record = ApiKeyRecord {
            id: Uuid::new_v4(),
            name: new_key.name,
            description: new_key.description,
            permissions: new_key.permissions,
            usage_limit: new_key.usage_limit,
            api_key: new_key.api_key,
            is_active: new_key.is_active,
            created_at,
            last_used: None,
            user_id: new_key.user_id,
        };
        state.rows.push(record.clone());

        Ok(record)
    }

    async fn update(
        &self,
        id: Uuid,
        patch: ApiKeyPatch,
    ) -> Result<Option<ApiKeyRecord>, AppError> {
        let mut state = self.state.write().await;
        if state.fail_updates {
            return Err(injected_failure());
        }

        let Some(row) = state.rows.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        if let Some(name) = patch.name {
            row.name = name;
        }
        if let Some(description) = patch.description {
            row.description = description;
        }
        if let Some(permissions) = patch.permissions {
            row.permissions = permissions;
        }
        if let Some(usage_limit) = patch.usage_limit {
            row.usage_limit = usage_limit;
        }
        if let Some(is_active) = patch.is_active {
            row.is_active = is_active;
        }
        if let Some(last_used) = patch.last_used {
            row.last_used = Some(last_used);
        }

        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.state.write().await.rows.retain(|r| r.id != id);
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        if self.state.read().await.fail_selects {
            return Err(injected_failure());
        }
        Ok(())
    }
}
