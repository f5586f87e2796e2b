//! App state: clearance cache, proxy configuration, config.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use clearance_acquire::{
    CommandAcquirer, CommandAcquirerConfig, TimeoutAcquirer, UnavailableAcquirer,
};
use clearance_cache::{CacheConfig, KeyedClearanceCache};
use clearance_core::constants::{
    DEFAULT_ACQUIRE_TIMEOUT_SECONDS, DEFAULT_REQUIRED_VALUE, DEFAULT_TTL_SECONDS,
};
use clearance_core::traits::Acquirer;
use clearance_core::types::{validate_proxy_url, ProxyConfig};
use clearance_route::{MemoryProxyStore, ProxyManager};

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Clearance lifetime in seconds
    pub ttl_seconds: u64,
    /// Acquisition helper program; `None` disables acquisition
    pub acquirer_cmd: Option<String>,
    /// Arguments for the helper program
    pub acquirer_args: Vec<String>,
    /// Deadline for one acquisition attempt
    pub acquire_timeout_seconds: u64,
    /// Value a solved challenge is expected to yield
    pub required_value: Option<String>,
    /// Initial global proxy switch
    pub proxy_enabled: bool,
    /// Initial global proxy URL
    pub proxy_url: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_TTL_SECONDS,
            acquirer_cmd: None,
            acquirer_args: Vec::new(),
            acquire_timeout_seconds: DEFAULT_ACQUIRE_TIMEOUT_SECONDS,
            required_value: Some(DEFAULT_REQUIRED_VALUE.into()),
            proxy_enabled: false,
            proxy_url: None,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from the environment (and `.env` if present).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let defaults = Self::default();

        Self {
            ttl_seconds: env_u64("CLEARANCE_TTL_SECONDS").unwrap_or(defaults.ttl_seconds),
            acquirer_cmd: env_non_empty("CLEARANCE_ACQUIRER_CMD"),
            acquirer_args: env_non_empty("CLEARANCE_ACQUIRER_ARGS")
                .map(|args| args.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
            acquire_timeout_seconds: env_u64("CLEARANCE_ACQUIRE_TIMEOUT_SECONDS")
                .unwrap_or(defaults.acquire_timeout_seconds),
            required_value: match std::env::var("CLEARANCE_REQUIRED_VALUE") {
                Ok(v) if v.trim().is_empty() => None,
                Ok(v) => Some(v.trim().to_string()),
                Err(_) => defaults.required_value,
            },
            proxy_enabled: std::env::var("PROXY_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            proxy_url: env_non_empty("PROXY_URL"),
        }
    }

    /// Builds the acquirer described by this configuration.
    ///
    /// Without a helper program every acquisition reports "unavailable".
    pub fn build_acquirer(&self) -> Arc<dyn Acquirer> {
        match &self.acquirer_cmd {
            Some(program) => {
                let command = CommandAcquirer::with_config(
                    CommandAcquirerConfig::new(program)
                        .with_args(self.acquirer_args.clone())
                        .with_required_value(self.required_value.clone()),
                );
                Arc::new(TimeoutAcquirer::new(
                    command,
                    Duration::from_secs(self.acquire_timeout_seconds),
                ))
            }
            None => Arc::new(UnavailableAcquirer::default()),
        }
    }

    fn initial_proxy_config(&self) -> ProxyConfig {
        let proxy_url = self.proxy_url.as_deref().and_then(|url| match validate_proxy_url(url) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(error = %e, "Ignoring configured proxy URL");
                None
            }
        });

        ProxyConfig {
            proxy_enabled: self.proxy_enabled,
            proxy_url,
        }
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_u64(name: &str) -> Option<u64> {
    let raw = env_non_empty(name)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(name, value = %raw, "Ignoring non-numeric setting");
            None
        }
    }
}

/// Shared state behind every handler.
pub struct AppState {
    /// Server configuration
    pub config: ApiConfig,
    /// The clearance cache
    pub cache: KeyedClearanceCache,
    /// Route resolution and global proxy settings
    pub proxies: Arc<ProxyManager>,
    /// Backing store for proxy settings
    pub proxy_store: Arc<MemoryProxyStore>,
}

impl AppState {
    /// Creates state with the acquirer described by `config`.
    pub fn new(config: ApiConfig) -> Self {
        let acquirer = config.build_acquirer();
        Self::with_acquirer(config, acquirer)
    }

    /// Creates state around a specific acquirer.
    pub fn with_acquirer(config: ApiConfig, acquirer: Arc<dyn Acquirer>) -> Self {
        let proxy_store = Arc::new(MemoryProxyStore::with_config(config.initial_proxy_config()));
        let proxies = Arc::new(ProxyManager::new(proxy_store.clone()));

        let cache_config = CacheConfig::with_ttl_seconds(config.ttl_seconds);
        let cache = KeyedClearanceCache::with_config(acquirer, cache_config)
            .with_route_provider(proxies.clone());

        Self {
            config,
            cache,
            proxies,
            proxy_store,
        }
    }
}
