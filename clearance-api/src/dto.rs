//! DTOs for API requests and responses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use clearance_core::types::ClientId;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "ok"
    pub status: String,
    /// Crate version
    pub version: String,
}

/// Query for fetching clearance.
///
/// `proxy` selects the route directly; otherwise the route is resolved from
/// `client_id` (or the global proxy when both are absent).
#[derive(Debug, Deserialize)]
pub struct ClearanceQuery {
    /// Explicit proxy URL
    pub proxy: Option<String>,
    /// Client whose route should be used
    pub client_id: Option<ClientId>,
    /// Skip the cache and acquire anew
    #[serde(default)]
    pub force: bool,
}

/// Clearance for one route.
#[derive(Debug, Serialize)]
pub struct ClearanceResponse {
    /// Route key the clearance belongs to
    pub route: String,
    /// Whether the route is a direct connection
    pub direct: bool,
    /// Credential values
    pub values: BTreeMap<String, String>,
    /// Identity to send with the values
    pub identity: String,
    /// Values rendered as a Cookie header
    pub cookie_header: String,
}

/// Query for invalidating one route.
#[derive(Debug, Deserialize)]
pub struct InvalidateQuery {
    /// Proxy URL; absent means the direct route
    pub proxy: Option<String>,
}

/// Result of invalidating one route.
#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    /// Route key
    pub route: String,
    /// Whether an entry was removed
    pub removed: bool,
}

/// Result of invalidating every route.
#[derive(Debug, Serialize)]
pub struct InvalidateAllResponse {
    /// Number of entries removed
    pub cleared: usize,
}

/// Request to update the global proxy.
#[derive(Debug, Deserialize)]
pub struct UpdateProxyConfigRequest {
    /// Use the global proxy as fallback
    pub proxy_enabled: bool,
    /// Global proxy URL (empty or absent clears it)
    pub proxy_url: Option<String>,
}

/// Request to set or clear a client's proxy override.
#[derive(Debug, Deserialize)]
pub struct ClientProxyRequest {
    /// Proxy URL (empty or absent clears the override)
    pub proxy_url: Option<String>,
}

/// Result of a client override update.
#[derive(Debug, Serialize)]
pub struct ClientProxyResponse {
    /// Client id
    pub client_id: ClientId,
    /// Override now in effect
    pub proxy_url: Option<String>,
    /// Override before the update
    pub previous: Option<String>,
}
