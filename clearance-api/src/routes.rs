//! API route configuration.

use std::sync::Arc;

use axum::{
    routing::{delete, get, put},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// Creates the API router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))

        // Clearance cache
        .route(
            "/api/v1/clearance",
            get(handlers::get_clearance).delete(handlers::invalidate_clearance),
        )
        .route("/api/v1/clearance/all", delete(handlers::invalidate_all))
        .route("/api/v1/clearance/stats", get(handlers::get_stats))
        .route("/api/v1/clearance/entries", get(handlers::list_entries))

        // Proxy configuration
        .route(
            "/api/v1/proxy/config",
            get(handlers::get_proxy_config).put(handlers::update_proxy_config),
        )
        .route("/api/v1/proxy/clients/:id", put(handlers::set_client_proxy))

        .with_state(state)
}
