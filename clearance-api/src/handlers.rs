//! API route handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::info;

use clearance_cache::{CacheStats, CachedClearanceInfo};
use clearance_core::types::{validate_proxy_url, ClientId, ProxyConfig, RouteKey};

use crate::dto::*;
use crate::error::ApiError;
use crate::state::AppState;

type Result<T> = std::result::Result<T, ApiError>;

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// Route for a caller-supplied proxy. Blank means direct; anything else
/// must be a valid proxy URL, so arbitrary strings never become routes.
fn route_for_proxy(proxy: &str) -> Result<RouteKey> {
    let proxy = proxy.trim();
    if proxy.is_empty() {
        return Ok(RouteKey::direct());
    }
    let url = validate_proxy_url(proxy)?;
    Ok(RouteKey::from_proxy(Some(&url)))
}

/// GET /api/v1/clearance
pub async fn get_clearance(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ClearanceQuery>,
) -> Result<Json<ClearanceResponse>> {
    let route = match query.proxy.as_deref() {
        Some(proxy) => route_for_proxy(proxy)?,
        None => state.cache.resolve_route(query.client_id).await?,
    };

    let clearance = state.cache.get(&route, query.force).await?;

    Ok(Json(ClearanceResponse {
        route: route.to_string(),
        direct: route.is_direct(),
        cookie_header: clearance.cookie_header(),
        values: clearance.values,
        identity: clearance.identity,
    }))
}

/// DELETE /api/v1/clearance
pub async fn invalidate_clearance(
    State(state): State<Arc<AppState>>,
    Query(query): Query<InvalidateQuery>,
) -> Result<Json<InvalidateResponse>> {
    let route = match query.proxy.as_deref() {
        Some(proxy) => route_for_proxy(proxy)?,
        None => RouteKey::direct(),
    };
    let removed = state.cache.invalidate(&route);

    Ok(Json(InvalidateResponse {
        route: route.to_string(),
        removed,
    }))
}

/// DELETE /api/v1/clearance/all
pub async fn invalidate_all(State(state): State<Arc<AppState>>) -> Json<InvalidateAllResponse> {
    Json(InvalidateAllResponse {
        cleared: state.cache.invalidate_all(),
    })
}

/// GET /api/v1/clearance/stats
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<CacheStats> {
    Json(state.cache.stats())
}

/// GET /api/v1/clearance/entries
pub async fn list_entries(State(state): State<Arc<AppState>>) -> Json<Vec<CachedClearanceInfo>> {
    Json(state.cache.snapshot())
}

/// GET /api/v1/proxy/config
pub async fn get_proxy_config(State(state): State<Arc<AppState>>) -> Result<Json<ProxyConfig>> {
    Ok(Json(state.proxies.proxy_config().await?))
}

/// PUT /api/v1/proxy/config
pub async fn update_proxy_config(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateProxyConfigRequest>,
) -> Result<Json<ProxyConfig>> {
    let config = state
        .proxies
        .update_proxy_config(req.proxy_enabled, req.proxy_url.as_deref())
        .await?;
    Ok(Json(config))
}

/// PUT /api/v1/proxy/clients/:id
pub async fn set_client_proxy(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<ClientId>,
    Json(req): Json<ClientProxyRequest>,
) -> Result<Json<ClientProxyResponse>> {
    let proxy_url = match req.proxy_url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => Some(validate_proxy_url(url)?),
        _ => None,
    };

    let previous = state.proxy_store.set_client_proxy(client_id, proxy_url.clone());
    info!(client_id, has_proxy = proxy_url.is_some(), "Client proxy override updated");

    Ok(Json(ClientProxyResponse {
        client_id,
        proxy_url,
        previous,
    }))
}
