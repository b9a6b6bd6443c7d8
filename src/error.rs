//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// # Error Categories
///
/// - **Validation Errors**: Caller-supplied data fails a precondition
/// - **Not Found Errors**: The referenced API key id does not exist
/// - **Store Errors**: The persistence layer failed (including key collisions)
/// - **Authentication Errors**: Missing or invalid API key at the HTTP boundary
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    ///
    /// Returns HTTP 500 and hides the details from the client.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A freshly generated `api_key` already exists in the table.
    ///
    /// Kept apart from `Database` so the store can regenerate and retry.
    #[error("Generated API key collided with an existing key")]
    KeyCollision,

    /// No API key record has the requested id.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("API key not found")]
    ApiKeyNotFound,

    /// Request data is invalid (e.g., missing name).
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("{0}")]
    Validation(String),

    /// The request carried no candidate API key at all.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("API key is required")]
    MissingApiKey,

    /// API key is unknown or inactive.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Invalid API key")]
    InvalidApiKey,
}

impl AppError {
    /// Shorthand for building a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    /// HTTP status this error maps to at the boundary.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::MissingApiKey => StatusCode::BAD_REQUEST,
            AppError::InvalidApiKey => StatusCode::UNAUTHORIZED,
            AppError::ApiKeyNotFound => StatusCode::NOT_FOUND,
            AppError::KeyCollision => StatusCode::CONFLICT,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for the JSON error body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::MissingApiKey => "missing_api_key",
            AppError::InvalidApiKey => "invalid_api_key",
            AppError::ApiKeyNotFound => "api_key_not_found",
            AppError::KeyCollision => "api_key_collision",
            AppError::Database(_) => "internal_error",
        }
    }

    /// Message that is safe to show to a client.
    ///
    /// Database details never leave the process.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Database(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        }
    }
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Database(ref err) = self {
            tracing::error!("Database error: {:?}", err);
        }

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.public_message()
            }
        }));

        (self.status_code(), body).into_response()
    }
}
