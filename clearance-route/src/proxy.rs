//! Route resolution over a proxy configuration store.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use clearance_core::error::Result;
use clearance_core::traits::{ProxyConfigStore, RouteConfigProvider};
use clearance_core::types::{validate_proxy_url, ClientId, ProxyConfig};

/// Resolves the proxy a client should use and manages the global setting.
///
/// Resolution order:
/// 1. the client's own override, if any
/// 2. the global proxy, if enabled
/// 3. none (direct connection)
///
/// Reads go straight to the store; nothing is cached here.
pub struct ProxyManager {
    store: Arc<dyn ProxyConfigStore>,
}

impl ProxyManager {
    /// Creates a manager over the given store.
    pub fn new(store: Arc<dyn ProxyConfigStore>) -> Self {
        Self { store }
    }

    /// Returns the proxy URL for a client, with fallback to the global proxy.
    #[instrument(skip(self))]
    pub async fn proxy_url(&self, client_id: Option<ClientId>) -> Result<Option<String>> {
        if let Some(id) = client_id {
            let override_url = self.store.client_proxy(id).await?;
            if let Some(url) = override_url.filter(|url| !url.trim().is_empty()) {
                debug!("Using client proxy override");
                return Ok(Some(url));
            }
        }

        let config = self.store.proxy_config().await?;
        Ok(config.effective_url().map(str::to_string))
    }

    /// Returns the global proxy configuration.
    pub async fn proxy_config(&self) -> Result<ProxyConfig> {
        self.store.proxy_config().await
    }

    /// Replaces the global proxy configuration.
    ///
    /// A non-empty URL must parse and use a supported proxy scheme. An empty
    /// URL clears it.
    #[instrument(skip(self, proxy_url))]
    pub async fn update_proxy_config(
        &self,
        enabled: bool,
        proxy_url: Option<&str>,
    ) -> Result<ProxyConfig> {
        let proxy_url = match proxy_url.map(str::trim) {
            Some(url) if !url.is_empty() => Some(validate_proxy_url(url)?),
            _ => None,
        };

        let config = ProxyConfig {
            proxy_enabled: enabled,
            proxy_url,
        };
        self.store.update_proxy_config(config.clone()).await?;

        info!(enabled, has_url = config.proxy_url.is_some(), "Proxy configuration updated");
        Ok(config)
    }
}

#[async_trait]
impl RouteConfigProvider for ProxyManager {
    async fn resolve_route(&self, client_id: Option<ClientId>) -> Result<Option<String>> {
        self.proxy_url(client_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryProxyStore;
    use clearance_core::error::ClearanceError;

    const GLOBAL: &str = "http://global:3128";

    fn manager_with(store: Arc<MemoryProxyStore>) -> ProxyManager {
        ProxyManager::new(store)
    }

    fn global_store() -> Arc<MemoryProxyStore> {
        Arc::new(MemoryProxyStore::with_config(ProxyConfig::enabled(GLOBAL)))
    }

    #[tokio::test]
    async fn test_direct_when_nothing_configured() {
        let manager = manager_with(Arc::new(MemoryProxyStore::new()));

        assert_eq!(manager.proxy_url(None).await.unwrap(), None);
        assert_eq!(manager.proxy_url(Some(1)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_global_fallback() {
        let store = global_store();
        let manager = manager_with(store);

        assert_eq!(manager.proxy_url(None).await.unwrap().as_deref(), Some(GLOBAL));
        assert_eq!(manager.proxy_url(Some(9)).await.unwrap().as_deref(), Some(GLOBAL));
    }

    #[tokio::test]
    async fn test_client_override_wins() {
        let store = global_store();
        store.set_client_proxy(7, Some("socks5://client:1080".into()));
        let manager = manager_with(store);

        let client = manager.proxy_url(Some(7)).await.unwrap();
        assert_eq!(client.as_deref(), Some("socks5://client:1080"));
        assert_eq!(manager.proxy_url(Some(8)).await.unwrap().as_deref(), Some(GLOBAL));
    }

    #[tokio::test]
    async fn test_client_override_without_global() {
        let store = Arc::new(MemoryProxyStore::new());
        store.set_client_proxy(7, Some("http://client:8080".into()));
        let manager = manager_with(store);

        let client = manager.resolve_route(Some(7)).await.unwrap();
        assert_eq!(client.as_deref(), Some("http://client:8080"));
        assert_eq!(manager.resolve_route(None).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_disabled_global_is_ignored() {
        let store = Arc::new(MemoryProxyStore::new());
        let manager = manager_with(store);

        manager.update_proxy_config(false, Some("http://global:3128")).await.unwrap();

        assert_eq!(manager.proxy_url(None).await.unwrap(), None);
        assert_eq!(
            manager.proxy_config().await.unwrap().proxy_url.as_deref(),
            Some("http://global:3128")
        );
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_url() {
        let manager = manager_with(Arc::new(MemoryProxyStore::new()));

        let err = manager.update_proxy_config(true, Some("ftp://nope:21")).await.unwrap_err();
        assert!(matches!(err, ClearanceError::InvalidProxyUrl(_)));
        assert_eq!(manager.proxy_config().await.unwrap(), ProxyConfig::default());
    }

    #[tokio::test]
    async fn test_update_empty_url_clears() {
        let store = global_store();
        let manager = manager_with(store);

        let config = manager.update_proxy_config(true, Some("  ")).await.unwrap();

        assert_eq!(config.proxy_url, None);
        assert_eq!(manager.proxy_url(None).await.unwrap(), None);
    }
}
