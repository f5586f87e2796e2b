//! Proxy configuration records.

use serde::{Deserialize, Serialize};

/// Identifier of a logical client (e.g. an upstream account token).
pub type ClientId = u64;

/// Global proxy settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Whether the global proxy is used as a fallback
    pub proxy_enabled: bool,
    /// Global proxy URL
    pub proxy_url: Option<String>,
}

impl ProxyConfig {
    /// Creates an enabled config for the given proxy.
    pub fn enabled(proxy_url: impl Into<String>) -> Self {
        Self {
            proxy_enabled: true,
            proxy_url: Some(proxy_url.into()),
        }
    }

    /// The proxy to use when no client override applies.
    ///
    /// `None` unless the proxy is enabled and a non-empty URL is set.
    pub fn effective_url(&self) -> Option<&str> {
        if !self.proxy_enabled {
            return None;
        }
        self.proxy_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_url() {
        assert_eq!(ProxyConfig::default().effective_url(), None);
        assert_eq!(
            ProxyConfig::enabled("http://proxy:3128").effective_url(),
            Some("http://proxy:3128")
        );

        let disabled = ProxyConfig {
            proxy_enabled: false,
            proxy_url: Some("http://proxy:3128".into()),
        };
        assert_eq!(disabled.effective_url(), None);

        assert_eq!(ProxyConfig::enabled("  ").effective_url(), None);
    }
}
