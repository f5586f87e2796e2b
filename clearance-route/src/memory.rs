//! In-memory proxy configuration store.
//!
//! Thread-safe storage suitable for development, testing, and single-process
//! deployments. Contents reset on restart.

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::debug;

use clearance_core::error::Result;
use clearance_core::traits::ProxyConfigStore;
use clearance_core::types::{ClientId, ProxyConfig};

/// In-memory [`ProxyConfigStore`].
#[derive(Debug, Default)]
pub struct MemoryProxyStore {
    /// Per-client overrides: client → proxy URL
    client_proxies: DashMap<ClientId, String>,
    /// Global configuration
    config: RwLock<ProxyConfig>,
}

impl MemoryProxyStore {
    /// Creates an empty store (no global proxy, no overrides).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with the given global configuration.
    pub fn with_config(config: ProxyConfig) -> Self {
        Self {
            client_proxies: DashMap::new(),
            config: RwLock::new(config),
        }
    }

    /// Sets or clears the proxy override for a client.
    ///
    /// Returns the previous override.
    pub fn set_client_proxy(
        &self,
        client_id: ClientId,
        proxy_url: Option<String>,
    ) -> Option<String> {
        debug!(client_id, has_proxy = proxy_url.is_some(), "Client proxy updated");
        match proxy_url {
            Some(url) => self.client_proxies.insert(client_id, url),
            None => self.client_proxies.remove(&client_id).map(|(_, url)| url),
        }
    }

    /// Number of clients with an override.
    pub fn override_count(&self) -> usize {
        self.client_proxies.len()
    }
}

#[async_trait]
impl ProxyConfigStore for MemoryProxyStore {
    async fn client_proxy(&self, client_id: ClientId) -> Result<Option<String>> {
        Ok(self
            .client_proxies
            .get(&client_id)
            .map(|entry| entry.value().clone()))
    }

    async fn proxy_config(&self) -> Result<ProxyConfig> {
        Ok(self.config.read().clone())
    }

    async fn update_proxy_config(&self, config: ProxyConfig) -> Result<()> {
        *self.config.write() = config;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_store() {
        let store = MemoryProxyStore::new();

        assert_eq!(store.client_proxy(1).await.unwrap(), None);
        assert_eq!(store.proxy_config().await.unwrap(), ProxyConfig::default());
    }

    #[tokio::test]
    async fn test_client_overrides() {
        let store = MemoryProxyStore::new();

        assert_eq!(store.set_client_proxy(1, Some("http://a:1".into())), None);
        assert_eq!(
            store.set_client_proxy(1, Some("http://b:2".into())),
            Some("http://a:1".to_string())
        );
        assert_eq!(store.client_proxy(1).await.unwrap(), Some("http://b:2".to_string()));
        assert_eq!(store.override_count(), 1);

        assert_eq!(store.set_client_proxy(1, None), Some("http://b:2".to_string()));
        assert_eq!(store.client_proxy(1).await.unwrap(), None);
        assert_eq!(store.set_client_proxy(1, None), None);
    }

    #[tokio::test]
    async fn test_update_config() {
        let store = MemoryProxyStore::new();
        store
            .update_proxy_config(ProxyConfig::enabled("http://proxy:3128"))
            .await
            .unwrap();

        let config = store.proxy_config().await.unwrap();
        assert!(config.proxy_enabled);
        assert_eq!(config.proxy_url.as_deref(), Some("http://proxy:3128"));
    }
}
