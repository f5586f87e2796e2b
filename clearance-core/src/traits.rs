//! Collaborator traits for the clearance cache.
//!
//! The cache owns coordination only. Producing credentials and deciding which
//! route a client uses are delegated through these seams.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Clearance, ClientId, ProxyConfig, RouteKey};

// ═══════════════════════════════════════════════════════════════════════════════
// ACQUIRER TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Performs the expensive, possibly flaky operation that yields fresh clearance.
///
/// Implementations might:
/// - drive a headless browser through a challenge page
/// - call out to an external helper process
/// - return canned values (tests)
///
/// Must be safe to call concurrently for *different* routes. The cache never
/// calls it twice at the same time for the same route.
///
/// Return [`ClearanceError::AcquisitionUnavailable`](crate::ClearanceError::AcquisitionUnavailable)
/// when the mechanism cannot run at all, and
/// [`ClearanceError::AcquisitionFailed`](crate::ClearanceError::AcquisitionFailed)
/// when a single attempt produced nothing usable.
#[async_trait]
pub trait Acquirer: Send + Sync {
    /// Obtains fresh clearance for the given route.
    async fn acquire(&self, route: &RouteKey) -> Result<Clearance>;
}

#[async_trait]
impl<A: Acquirer + ?Sized> Acquirer for Arc<A> {
    async fn acquire(&self, route: &RouteKey) -> Result<Clearance> {
        (**self).acquire(route).await
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ROUTE RESOLUTION TRAITS
// ═══════════════════════════════════════════════════════════════════════════════

/// Supplies the proxy a logical client should use.
#[async_trait]
pub trait RouteConfigProvider: Send + Sync {
    /// Resolves the proxy URL for a client.
    ///
    /// A client-specific override wins; otherwise the global proxy if enabled;
    /// otherwise `None`, meaning a direct connection.
    async fn resolve_route(&self, client_id: Option<ClientId>) -> Result<Option<String>>;
}

/// Persistence behind route resolution.
///
/// Implementations might use:
/// - In-memory storage (for testing/development)
/// - A relational database (for production)
#[async_trait]
pub trait ProxyConfigStore: Send + Sync {
    /// Returns the proxy override for a client, if it has one.
    async fn client_proxy(&self, client_id: ClientId) -> Result<Option<String>>;

    /// Returns the global proxy configuration.
    async fn proxy_config(&self) -> Result<ProxyConfig>;

    /// Replaces the global proxy configuration.
    async fn update_proxy_config(&self, config: ProxyConfig) -> Result<()>;
}
