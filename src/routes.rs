//! Shared application state and the HTTP route table.

use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, patch, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers, middleware,
    services::{
        key_generator::KeyGenerator, key_store::KeyStore, key_validator::KeyValidator,
        lifecycle::KeyLifecycleFacade,
    },
    store::ApiKeyTable,
};

/// State shared with every handler via `State` extraction.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<KeyStore>,
    pub keys: KeyLifecycleFacade,
    pub validator: KeyValidator,
}

impl AppState {
    /// Wire the key services around an injected table handle.
    pub fn new(table: Arc<dyn ApiKeyTable>, key_generation_attempts: u32) -> Self {
        let store =
            Arc::new(KeyStore::new(table, KeyGenerator).with_max_attempts(key_generation_attempts));

        Self {
            keys: KeyLifecycleFacade::new(Arc::clone(&store)),
            validator: KeyValidator::new(Arc::clone(&store)),
            store,
        }
    }
}

/// Build the full router.
pub fn router(state: AppState) -> Router {
    // Routes gated by a valid API key
    let protected_routes = Router::new()
        .route("/api/protected", get(handlers::protected::protected_resource))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_api_key,
        ));

    Router::new()
        // Public routes
        .route("/health", get(handlers::health::health_check))
        // Dashboard lifecycle operations
        .route(
            "/api/keys",
            get(handlers::api_keys::list_keys).post(handlers::api_keys::create_key),
        )
        .route(
            "/api/keys/{id}",
            put(handlers::api_keys::update_key).delete(handlers::api_keys::delete_key),
        )
        .route(
            "/api/keys/{id}/status",
            patch(handlers::api_keys::set_key_status),
        )
        // Key validation boundary
        .route(
            "/api/validate-api-key",
            get(handlers::validate::validate_query).post(handlers::validate::validate_body),
        )
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
