//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, headers)
//! 2. Calls the key services
//! 3. Returns HTTP response (JSON, status code)

/// API key lifecycle endpoints for the dashboard
pub mod api_keys;
/// Service health endpoint
pub mod health;
/// Example endpoint gated by a valid API key
pub mod protected;
/// API key validation endpoint
pub mod validate;
