//! API key validation endpoint.
//!
//! - POST /api/validate-api-key with `{ "apiKey": "..." }`
//! - GET /api/validate-api-key?apiKey=...
//!
//! Either form also accepts the key in the `x-api-key` header.
//!
//! # Status Mapping
//!
//! - valid key → 200
//! - unknown or inactive key → 401
//! - no key supplied → 400
//! - store failure → 500

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
};

use crate::{
    error::AppError,
    middleware::auth::api_key_from_headers,
    models::api_key::{ValidateApiKeyRequest, ValidationOutcome},
    routes::AppState,
};

type ValidationResponse = (StatusCode, Json<ValidationOutcome>);

/// Validate a key sent in the JSON body (or header).
pub async fn validate_body(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ValidateApiKeyRequest>, JsonRejection>,
) -> ValidationResponse {
    let from_body = body.ok().and_then(|Json(request)| request.api_key);
    respond(&state, api_key_from_headers(&headers).or(from_body)).await
}

/// Validate a key sent as the `apiKey` query parameter (or header).
pub async fn validate_query(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ValidateApiKeyRequest>,
) -> ValidationResponse {
    respond(&state, api_key_from_headers(&headers).or(query.api_key)).await
}

async fn respond(state: &AppState, candidate: Option<String>) -> ValidationResponse {
    let Some(candidate) = candidate.filter(|k| !k.is_empty()) else {
        let missing = AppError::MissingApiKey;
        return (
            missing.status_code(),
            Json(ValidationOutcome::failed(missing.to_string())),
        );
    };

    let outcome = state.validator.check(&candidate).await;
    let status = if outcome.error.is_some() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else if outcome.is_valid {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    };

    (status, Json(outcome))
}
