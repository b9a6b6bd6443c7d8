//! Lifecycle facade - the operation surface used by the dashboard.
//!
//! Each operation normalizes raw request input, delegates to the
//! [`KeyStore`] and returns an [`ApiOutcome`]: `{ "data": ..., "error": ... }`.
//! Errors never cross this boundary as `Err`; they become a message plus the
//! HTTP status that matches their kind.

use std::sync::Arc;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::api_key::{
        ApiKeyRecord, CreateApiKeyRequest, DEFAULT_USAGE_LIMIT, Permission, UpdateApiKeyRequest,
    },
    services::key_store::{KeyChanges, KeyStore, NewKeyFields},
};

/// Value-shaped result of a lifecycle operation.
#[derive(Debug, Serialize)]
pub struct ApiOutcome<T> {
    pub data: Option<T>,
    pub error: Option<String>,

    /// Status to answer with at the HTTP boundary
    #[serde(skip)]
    pub status: StatusCode,
}

impl<T> ApiOutcome<T> {
    fn settle(result: Result<T, AppError>, success: StatusCode, action: &str) -> Self {
        match result {
            Ok(data) => Self {
                data: Some(data),
                error: None,
                status: success,
            },
            Err(err) => {
                tracing::error!("Error {} API key: {}", action, err);
                Self::failure(err)
            }
        }
    }

    /// Outcome for a request that failed before reaching the store.
    pub fn failure(err: AppError) -> Self {
        Self {
            data: None,
            error: Some(err.public_message()),
            status: err.status_code(),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiOutcome<U> {
        ApiOutcome {
            data: self.data.map(f),
            error: self.error,
            status: self.status,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiOutcome<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// The five lifecycle operations exposed to presentation code.
#[derive(Clone)]
pub struct KeyLifecycleFacade {
    store: Arc<KeyStore>,
}

impl KeyLifecycleFacade {
    pub fn new(store: Arc<KeyStore>) -> Self {
        Self { store }
    }

    /// All keys, newest first, optionally only those owned by `owner`.
    pub async fn list(&self, owner: Option<Uuid>) -> ApiOutcome<Vec<ApiKeyRecord>> {
        ApiOutcome::settle(self.store.list(owner).await, StatusCode::OK, "fetching")
    }

    /// Create a key from raw form input.
    pub async fn create(&self, request: CreateApiKeyRequest) -> ApiOutcome<ApiKeyRecord> {
        let result = async move {
            let fields = NewKeyFields {
                name: request.name.unwrap_or_default(),
                description: request.description,
                permissions: parse_permission(request.permissions.as_deref())?,
                usage_limit: Some(
                    request
                        .usage_limit
                        .map(|limit| limit.normalize())
                        .unwrap_or(DEFAULT_USAGE_LIMIT),
                ),
            };
            self.store.create(fields, request.user_id).await
        }
        .await;

        ApiOutcome::settle(result, StatusCode::CREATED, "creating")
    }

    /// Update the mutable fields present in `request`.
    pub async fn update(&self, id: Uuid, request: UpdateApiKeyRequest) -> ApiOutcome<ApiKeyRecord> {
        let result = async move {
            let changes = KeyChanges {
                name: request.name,
                description: request.description,
                permissions: parse_permission(request.permissions.as_deref())?,
                usage_limit: request.usage_limit.map(|limit| limit.normalize()),
            };
            self.store.update(id, changes).await
        }
        .await;

        ApiOutcome::settle(result, StatusCode::OK, "updating")
    }

    pub async fn delete(&self, id: Uuid) -> ApiOutcome<()> {
        ApiOutcome::settle(self.store.delete(id).await, StatusCode::OK, "deleting")
    }

    pub async fn set_active(&self, id: Uuid, is_active: bool) -> ApiOutcome<ApiKeyRecord> {
        ApiOutcome::settle(
            self.store.set_active(id, is_active).await,
            StatusCode::OK,
            "toggling status of",
        )
    }
}

fn parse_permission(input: Option<&str>) -> Result<Option<Permission>, AppError> {
    match input {
        Some(raw) => Permission::parse(raw),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::api_key::UsageLimitInput,
        services::{key_generator::KeyGenerator, key_validator::KeyValidator},
        store::memory::MemoryApiKeyTable,
    };

    fn facade_with(table: &MemoryApiKeyTable) -> (KeyLifecycleFacade, KeyValidator) {
        let store = Arc::new(KeyStore::new(Arc::new(table.clone()), KeyGenerator));
        (
            KeyLifecycleFacade::new(Arc::clone(&store)),
            KeyValidator::new(store),
        )
    }

    fn create_request(name: &str) -> CreateApiKeyRequest {
        CreateApiKeyRequest {
            name: Some(name.to_string()),
            ..CreateApiKeyRequest::default()
        }
    }

    #[tokio::test]
    async fn create_validate_deactivate_scenario() {
        let table = MemoryApiKeyTable::new();
        let (facade, validator) = facade_with(&table);

        let created = facade
            .create(CreateApiKeyRequest {
                usage_limit: Some(UsageLimitInput::Text("500".to_string())),
                ..create_request("prod")
            })
            .await;
        assert_eq!(created.status, StatusCode::CREATED);
        let record = created.data.unwrap();
        assert_eq!(record.usage_limit, 500);
        assert_eq!(record.permissions, "read");
        assert!(record.is_active);

        assert!(validator.validate(&record.api_key).await.unwrap().is_valid);

        let toggled = facade.set_active(record.id, false).await;
        assert!(toggled.error.is_none());
        assert!(!validator.validate(&record.api_key).await.unwrap().is_valid);
    }

    #[tokio::test]
    async fn create_then_list_round_trips_mutable_fields() {
        let table = MemoryApiKeyTable::new();
        let (facade, _) = facade_with(&table);

        let created = facade
            .create(CreateApiKeyRequest {
                description: Some("batch jobs".to_string()),
                permissions: Some("write".to_string()),
                usage_limit: Some(UsageLimitInput::Text("many".to_string())),
                ..create_request("batch")
            })
            .await
            .data
            .unwrap();

        let listed = facade.list(None).await.data.unwrap();
        let found = listed.iter().find(|r| r.id == created.id).unwrap();

        assert_eq!(found.name, "batch");
        assert_eq!(found.description, "batch jobs");
        assert_eq!(found.permissions, "write");
        assert_eq!(found.usage_limit, 1000);
    }

    #[tokio::test]
    async fn missing_name_becomes_an_error_value() {
        let table = MemoryApiKeyTable::new();
        let (facade, _) = facade_with(&table);

        let outcome = facade.create(CreateApiKeyRequest::default()).await;

        assert!(outcome.data.is_none());
        assert_eq!(outcome.error.as_deref(), Some("Name is required"));
        assert_eq!(outcome.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_permission_is_rejected() {
        let table = MemoryApiKeyTable::new();
        let (facade, _) = facade_with(&table);

        let outcome = facade
            .create(CreateApiKeyRequest {
                permissions: Some("superuser".to_string()),
                ..create_request("x")
            })
            .await;

        assert_eq!(outcome.status, StatusCode::BAD_REQUEST);
        assert!(facade.list(None).await.data.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_of_missing_key_reports_not_found() {
        let table = MemoryApiKeyTable::new();
        let (facade, _) = facade_with(&table);

        let outcome = facade
            .update(Uuid::new_v4(), UpdateApiKeyRequest::default())
            .await;

        assert_eq!(outcome.status, StatusCode::NOT_FOUND);
        assert_eq!(outcome.error.as_deref(), Some("API key not found"));
    }

    #[tokio::test]
    async fn update_keeps_usage_limit_when_absent() {
        let table = MemoryApiKeyTable::new();
        let (facade, _) = facade_with(&table);
        let record = facade
            .create(CreateApiKeyRequest {
                usage_limit: Some(UsageLimitInput::Integer(250)),
                ..create_request("keep")
            })
            .await
            .data
            .unwrap();

        let updated = facade
            .update(
                record.id,
                UpdateApiKeyRequest {
                    permissions: Some("admin".to_string()),
                    ..UpdateApiKeyRequest::default()
                },
            )
            .await
            .data
            .unwrap();

        assert_eq!(updated.usage_limit, 250);
        assert_eq!(updated.permissions, "admin");
        assert_eq!(updated.api_key, record.api_key);
    }

    #[tokio::test]
    async fn store_failure_is_reported_as_value() {
        let table = MemoryApiKeyTable::new();
        let (facade, _) = facade_with(&table);
        table.set_fail_selects(true).await;

        let outcome = facade.list(None).await;

        assert!(outcome.data.is_none());
        assert_eq!(outcome.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(outcome.error.as_deref(), Some("An internal error occurred"));
    }

    #[tokio::test]
    async fn delete_then_list_excludes_record() {
        let table = MemoryApiKeyTable::new();
        let (facade, _) = facade_with(&table);
        let record = facade.create(create_request("tmp")).await.data.unwrap();

        let deleted = facade.delete(record.id).await;
        assert!(deleted.error.is_none());

        let listed = facade.list(None).await.data.unwrap();
        assert!(listed.iter().all(|r| r.id != record.id));
    }
}
