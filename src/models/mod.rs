//! Data models representing database entities.
//!
//! This module contains the `api_keys` row type and the request/response
//! types built around it.

/// API key record, request bodies and validation outcome
pub mod api_key;
