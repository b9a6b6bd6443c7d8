//! A resource only reachable with a valid API key.

use axum::{Extension, Json};
use serde::Serialize;
use uuid::Uuid;

use crate::middleware::auth::AuthContext;

#[derive(Debug, Serialize)]
pub struct ProtectedResponse {
    pub message: String,
    pub key_id: Uuid,
    pub key_name: String,
}

/// `GET /api/protected`
///
/// The auth middleware has already validated the key; this echoes which one.
pub async fn protected_resource(Extension(auth): Extension<AuthContext>) -> Json<ProtectedResponse> {
    Json(ProtectedResponse {
        message: format!("Valid API key \"{}\" - /protected can be accessed", auth.key_name),
        key_id: auth.api_key_id,
        key_name: auth.key_name,
    })
}
