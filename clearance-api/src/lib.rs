//! # Clearance API Server
//!
//! HTTP surface over the clearance cache and proxy configuration. Every
//! handler shares one [`KeyedClearanceCache`](clearance_cache::KeyedClearanceCache),
//! so concurrent requests for the same route coalesce into one acquisition.
//!
//! ## Endpoints
//!
//! - `GET /api/v1/clearance` - Get clearance for a proxy or client
//! - `DELETE /api/v1/clearance` - Invalidate one route
//! - `DELETE /api/v1/clearance/all` - Invalidate every route
//! - `GET /api/v1/clearance/stats` - Cache statistics
//! - `GET /api/v1/clearance/entries` - Cached routes (values omitted)
//! - `GET|PUT /api/v1/proxy/config` - Global proxy configuration
//! - `PUT /api/v1/proxy/clients/:id` - Per-client proxy override
//!
//! ## Example
//!
//! ```rust,ignore
//! use clearance_api::{ApiServer, ApiConfig};
//!
//! let server = ApiServer::new(ApiConfig::from_env());
//! server.run(([0, 0, 0, 0], 3002)).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod dto;
mod error;
mod handlers;
mod routes;
mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{ApiConfig, AppState};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Largest accepted request body. Requests only carry small JSON documents.
const MAX_BODY_BYTES: usize = 16 * 1024;

/// HTTP server wrapping shared [`AppState`].
pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    /// Builds state from `config`, including its acquirer.
    pub fn new(config: ApiConfig) -> Self {
        Self::with_state(Arc::new(AppState::new(config)))
    }

    /// Serves existing state, e.g. one built around a custom acquirer.
    pub fn with_state(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Shared state behind the handlers.
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Router with CORS, tracing and a body size limit applied.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        create_router(self.state.clone())
            .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Serves on `addr` until Ctrl+C.
    ///
    /// In-flight requests (including acquisitions they wait on) are allowed
    /// to finish before this returns.
    pub async fn run(self, addr: impl Into<SocketAddr>) -> std::io::Result<()> {
        let addr = addr.into();
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(%addr, ttl_seconds = self.state.config.ttl_seconds, "Clearance API listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        let stats = self.state.cache.stats();
        info!(
            acquisitions = stats.acquisitions,
            failures = stats.failures,
            hits = stats.hits,
            "Clearance API stopped"
        );
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Could not listen for shutdown signal");
        // Without a signal handler, serve until the process is killed.
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
