//! API key management HTTP handlers.
//!
//! This module implements the dashboard endpoints:
//! - GET /api/keys - List keys (optionally per owner, optionally masked)
//! - POST /api/keys - Create a key
//! - PUT /api/keys/{id} - Update name, description, permissions, usage limit
//! - DELETE /api/keys/{id} - Delete a key
//! - PATCH /api/keys/{id}/status - Activate or deactivate a key
//!
//! Every endpoint answers with `{ "data": ..., "error": ... }`. On failure
//! `data` is null, `error` holds the message and the status reflects the kind
//! of failure. Malformed ids, query strings and bodies are 400s in the same
//! shape.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::api_key::{
        ApiKeyRecord, CreateApiKeyRequest, ListApiKeysQuery, SetStatusRequest, UpdateApiKeyRequest,
    },
    routes::AppState,
    services::lifecycle::ApiOutcome,
};

/// List API keys, newest first.
///
/// # Endpoint
///
/// `GET /api/keys?user_id=<uuid>&masked=true`
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "data": [
///     {
///       "id": "550e8400-e29b-41d4-a716-446655440000",
///       "name": "prod",
///       "description": "",
///       "permissions": "read",
///       "usage_limit": 1000,
///       "api_key": "dand••••••••••••••••••••••••••••••••x9Qz",
///       "is_active": true,
///       "created_at": "2025-12-20T10:00:00Z",
///       "last_used": null,
///       "user_id": null
///     }
///   ],
///   "error": null
/// }
/// ```
pub async fn list_keys(
    State(state): State<AppState>,
    query: Result<Query<ListApiKeysQuery>, QueryRejection>,
) -> ApiOutcome<Vec<ApiKeyRecord>> {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return rejected(rejection.body_text()),
    };

    let outcome = state.keys.list(query.user_id).await;

    if query.masked {
        outcome.map(|records| records.into_iter().map(ApiKeyRecord::masked).collect())
    } else {
        outcome
    }
}

/// Create a new API key.
///
/// # Endpoint
///
/// `POST /api/keys`
///
/// # Request Body
///
/// ```json
/// {
///   "name": "prod",
///   "description": "Production traffic",
///   "permissions": "read",
///   "usageLimit": "500"
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: `data` holds the new record, including the full key
/// - **Error (400)**: Missing name or unknown permission
/// - **Error (409)**: Could not generate a unique key
/// - **Error (500)**: Database error
pub async fn create_key(
    State(state): State<AppState>,
    body: Result<Json<CreateApiKeyRequest>, JsonRejection>,
) -> ApiOutcome<ApiKeyRecord> {
    match body {
        Ok(Json(request)) => state.keys.create(request).await,
        Err(rejection) => rejected(rejection.body_text()),
    }
}

/// Update the mutable fields of a key.
///
/// # Endpoint
///
/// `PUT /api/keys/{id}`
///
/// Fields left out of the body keep their stored value.
///
/// # Response
///
/// - **Success (200 OK)**: `data` holds the updated record
/// - **Error (400)**: Blank name or unknown permission
/// - **Error (404)**: No key with this id
pub async fn update_key(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<UpdateApiKeyRequest>, JsonRejection>,
) -> ApiOutcome<ApiKeyRecord> {
    match (id, body) {
        (Ok(Path(id)), Ok(Json(request))) => state.keys.update(id, request).await,
        (Err(rejection), _) => rejected(rejection.body_text()),
        (_, Err(rejection)) => rejected(rejection.body_text()),
    }
}

/// Delete a key.
///
/// # Endpoint
///
/// `DELETE /api/keys/{id}`
///
/// Deleting an id that does not exist is reported as success.
pub async fn delete_key(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiOutcome<()> {
    match id {
        Ok(Path(id)) => state.keys.delete(id).await,
        Err(rejection) => rejected(rejection.body_text()),
    }
}

/// Activate or deactivate a key.
///
/// # Endpoint
///
/// `PATCH /api/keys/{id}/status`
///
/// # Request Body
///
/// ```json
/// { "is_active": false }
/// ```
pub async fn set_key_status(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<SetStatusRequest>, JsonRejection>,
) -> ApiOutcome<ApiKeyRecord> {
    match (id, body) {
        (Ok(Path(id)), Ok(Json(request))) => state.keys.set_active(id, request.is_active).await,
        (Err(rejection), _) => rejected(rejection.body_text()),
        (_, Err(rejection)) => rejected(rejection.body_text()),
    }
}

/// Extractor failures become a 400 with the usual `{data: null, error}` body.
fn rejected<T>(message: String) -> ApiOutcome<T> {
    tracing::warn!("Rejected API key request: {}", message);
    ApiOutcome::failure(AppError::validation(message))
}
