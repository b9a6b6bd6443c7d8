//! API key model and the request/response types built around it.
//!
//! This module defines:
//! - `ApiKeyRecord`: the persisted row of the `api_keys` table
//! - `Permission`: the access level a key grants
//! - Request bodies for the lifecycle endpoints, with the input
//!   normalization the dashboard relies on (string usage limits, defaults)
//! - `ValidationOutcome`: the value returned by key validation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Usage limit stored when the caller gives none or an unusable one.
pub const DEFAULT_USAGE_LIMIT: i32 = 1000;

/// Number of characters kept visible at each end of a masked key.
const MASK_VISIBLE_CHARS: usize = 4;

/// Represents an API key record from the database.
///
/// # Database Table
///
/// Maps to the `api_keys` table. `id`, `api_key` and `created_at` are
/// assigned once on insert and never change afterwards.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct ApiKeyRecord {
    /// Unique identifier for this API key
    pub id: Uuid,

    /// Human-readable name, never empty
    pub name: String,

    /// Free-form description, empty when not supplied
    pub description: String,

    /// Access level: "read", "write" or "admin"
    pub permissions: String,

    /// Advisory request quota. Stored and returned, never enforced.
    pub usage_limit: i32,

    /// The bearer credential itself (`dandi-` + 32 alphanumerics)
    pub api_key: String,

    /// Inactive keys always fail validation
    pub is_active: bool,

    /// Timestamp when this API key was created
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last successful validation
    pub last_used: Option<DateTime<Utc>>,

    /// Optional owner of the key (external identity)
    pub user_id: Option<Uuid>,
}

impl ApiKeyRecord {
    /// Copy of this record with `api_key` masked for display.
    pub fn masked(mut self) -> Self {
        self.api_key = mask_api_key(&self.api_key);
        self
    }
}

/// Mask a key for display: first and last four characters, 32 bullets between.
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let head: String = chars.iter().take(MASK_VISIBLE_CHARS).collect();
    let tail: String = chars[chars.len().saturating_sub(MASK_VISIBLE_CHARS)..]
        .iter()
        .collect();
    format!("{}{}{}", head, "•".repeat(32), tail)
}

/// Access level granted by an API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Permission {
    #[default]
    Read,
    Write,
    Admin,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Read => "read",
            Permission::Write => "write",
            Permission::Admin => "admin",
        }
    }

    /// Parse caller input. Blank input yields `None` so the caller can default it.
    pub fn parse(input: &str) -> Result<Option<Self>, AppError> {
        match input.trim().to_ascii_lowercase().as_str() {
            "" => Ok(None),
            "read" => Ok(Some(Permission::Read)),
            "write" => Ok(Some(Permission::Write)),
            "admin" => Ok(Some(Permission::Admin)),
            other => Err(AppError::validation(format!(
                "Unknown permission '{}': expected read, write or admin",
                other
            ))),
        }
    }
}

/// Usage limit as it arrives from the dashboard form: usually a number or a string.
///
/// Any other JSON value is accepted too and normalizes to the default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum UsageLimitInput {
    Integer(i64),
    Float(f64),
    Text(String),
    Other(serde_json::Value),
}

impl UsageLimitInput {
    /// Coerce to a positive `i32`, falling back to [`DEFAULT_USAGE_LIMIT`].
    ///
    /// Fractions are truncated and strings are read up to their first
    /// non-digit (`"500abc"` is 500). Zero, negative, out-of-range and
    /// unparsable values all become the default.
    pub fn normalize(&self) -> i32 {
        let parsed = match self {
            UsageLimitInput::Integer(n) => Some(*n),
            UsageLimitInput::Float(f) => float_to_limit(*f),
            UsageLimitInput::Text(s) => leading_integer(s),
            UsageLimitInput::Other(_) => None,
        };

        parsed
            .filter(|n| *n > 0)
            .and_then(|n| i32::try_from(n).ok())
            .unwrap_or(DEFAULT_USAGE_LIMIT)
    }
}

/// Optional sign followed by the longest run of ASCII digits, after leading whitespace.
fn leading_integer(input: &str) -> Option<i64> {
    let s = input.trim_start();
    let (sign, rest) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());

    rest[..digits_end].parse::<i64>().ok().map(|n| sign * n)
}

fn float_to_limit(value: f64) -> Option<i64> {
    if value.is_finite() && value.abs() < i64::MAX as f64 {
        Some(value.trunc() as i64)
    } else {
        None
    }
}

/// Request body for creating a new API key.
///
/// # JSON Example
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
/// # Validation
///
/// - `name`: Required, must not be blank
/// - `description`: Optional, defaults to ""
/// - `permissions`: Optional, defaults to "read"
/// - `usage_limit` / `usageLimit`: Optional number or string, defaults to 1000
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateApiKeyRequest {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub permissions: Option<String>,

    #[serde(default, alias = "usageLimit")]
    pub usage_limit: Option<UsageLimitInput>,

    /// Owner of the key, if the dashboard is user-scoped
    #[serde(default, alias = "userId")]
    pub user_id: Option<Uuid>,
}

/// Request body for updating an API key.
///
/// Only the fields present are changed. `id`, `api_key` and `created_at`
/// cannot be updated.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateApiKeyRequest {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub permissions: Option<String>,

    #[serde(default, alias = "usageLimit")]
    pub usage_limit: Option<UsageLimitInput>,
}

/// Request body for activating or deactivating a key.
#[derive(Debug, Clone, Deserialize)]
pub struct SetStatusRequest {
    #[serde(alias = "isActive")]
    pub is_active: bool,
}

/// Query string accepted by the list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListApiKeysQuery {
    /// Only return keys owned by this user
    pub user_id: Option<Uuid>,

    /// Replace each `api_key` with its masked form
    #[serde(default)]
    pub masked: bool,
}

/// Candidate key submitted to the validation endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValidateApiKeyRequest {
    #[serde(default, rename = "apiKey", alias = "api_key")]
    pub api_key: Option<String>,
}

/// The subset of a record returned by a successful validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyData {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
}

impl From<&ApiKeyRecord> for KeyData {
    fn from(record: &ApiKeyRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            is_active: record.is_active,
        }
    }
}

/// Value-shaped result of validating a key.
///
/// # JSON Example
///
/// ```json
/// {
///   "isValid": true,
///   "keyData": { "id": "...", "name": "prod", "is_active": true },
///   "error": null
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub is_valid: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_data: Option<KeyData>,

    pub error: Option<String>,
}

impl ValidationOutcome {
    pub fn valid(key_data: KeyData) -> Self {
        Self {
            is_valid: true,
            key_data: Some(key_data),
            error: None,
        }
    }

    pub fn invalid() -> Self {
        Self {
            is_valid: false,
            key_data: None,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            key_data: None,
            error: Some(message.into()),
        }
    }
}
