//! API key authentication middleware.
//!
//! This middleware intercepts every protected request to:
//! 1. Extract the API key from the `x-api-key` or `Authorization` header
//! 2. Validate it against the key store (active keys only)
//! 3. Inject authentication context into the request
//! 4. Reject the request with 400 (no key) or 401 (invalid key)

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{error::AppError, routes::AppState};

/// Header carrying a raw API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Authentication context attached to authenticated requests.
///
/// Route handlers extract it with `Extension<AuthContext>`.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// ID of the authenticated API key
    pub api_key_id: Uuid,

    /// Name given to the key in the dashboard
    pub key_name: String,
}

/// Candidate key from `x-api-key: <key>` or `Authorization: Bearer <key>`.
///
/// Empty values count as absent. The key is used exactly as sent.
pub fn api_key_from_headers(headers: &HeaderMap) -> Option<String> {
    let from_api_key_header = headers
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok());

    let from_bearer = || {
        headers
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
    };

    from_api_key_header
        .filter(|k| !k.is_empty())
        .or_else(|| from_bearer().filter(|k| !k.is_empty()))
        .map(str::to_string)
}

/// API key authentication middleware function.
///
/// # Flow
///
/// 1. Read the candidate key from the headers (400 if there is none)
/// 2. Validate it; store failures surface as 500
/// 3. If invalid: return 401 Unauthorized
/// 4. If valid: inject `AuthContext` and call the next handler
pub async fn require_api_key(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let api_key = api_key_from_headers(request.headers()).ok_or(AppError::MissingApiKey)?;

    let outcome = state.validator.validate(&api_key).await?;
    let key_data = outcome
        .key_data
        .filter(|_| outcome.is_valid)
        .ok_or(AppError::InvalidApiKey)?;

    request.extensions_mut().insert(AuthContext {
        api_key_id: key_data.id,
        key_name: key_data.name,
    });

    Ok(next.run(request).await)
}
