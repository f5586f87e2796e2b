//! Route keys: the cache's partition key.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{NO_PROXY_KEY, SUPPORTED_PROXY_SCHEMES};
use crate::error::{ClearanceError, Result};

/// Normalized identifier for an upstream route.
///
/// Either a proxy URL or [`NO_PROXY_KEY`] for direct connections. An empty or
/// whitespace-only proxy is the same as no proxy.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteKey(String);

impl RouteKey {
    /// Builds the key for an optional proxy URL.
    pub fn from_proxy(proxy_url: Option<&str>) -> Self {
        match proxy_url.map(str::trim) {
            Some(url) if !url.is_empty() => Self(url.to_string()),
            _ => Self::direct(),
        }
    }

    /// The key for direct (unproxied) connections.
    pub fn direct() -> Self {
        Self(NO_PROXY_KEY.to_string())
    }

    /// Returns true if this key denotes a direct connection.
    pub fn is_direct(&self) -> bool {
        self.0 == NO_PROXY_KEY
    }

    /// The proxy URL to hand to an acquirer, or `None` for direct.
    pub fn proxy_url(&self) -> Option<&str> {
        if self.is_direct() {
            None
        } else {
            Some(&self.0)
        }
    }

    /// The raw key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Option<&str>> for RouteKey {
    fn from(proxy_url: Option<&str>) -> Self {
        Self::from_proxy(proxy_url)
    }
}

impl From<&str> for RouteKey {
    fn from(proxy_url: &str) -> Self {
        Self::from_proxy(Some(proxy_url))
    }
}

/// Validates a proxy URL before it is stored in route configuration.
///
/// Returns the trimmed URL.
pub fn validate_proxy_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ClearanceError::InvalidProxyUrl("empty proxy URL".into()));
    }

    let parsed = Url::parse(trimmed)
        .map_err(|e| ClearanceError::InvalidProxyUrl(format!("{}: {}", trimmed, e)))?;

    if !SUPPORTED_PROXY_SCHEMES.contains(&parsed.scheme()) {
        return Err(ClearanceError::InvalidProxyUrl(format!(
            "unsupported scheme '{}'",
            parsed.scheme()
        )));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(ClearanceError::InvalidProxyUrl(format!("{}: missing host", trimmed)));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_none_and_empty_are_direct() {
        assert!(RouteKey::from_proxy(None).is_direct());
        assert!(RouteKey::from_proxy(Some("")).is_direct());
        assert!(RouteKey::from_proxy(Some("   ")).is_direct());
        assert_eq!(RouteKey::direct().as_str(), NO_PROXY_KEY);
        assert_eq!(RouteKey::direct().proxy_url(), None);
    }

    #[test]
    fn test_proxy_key_is_trimmed() {
        let key = RouteKey::from_proxy(Some("  http://proxy-a:8080 "));
        assert!(!key.is_direct());
        assert_eq!(key.proxy_url(), Some("http://proxy-a:8080"));
        assert_eq!(key, RouteKey::from("http://proxy-a:8080"));
    }

    #[test]
    fn test_proxy_and_direct_are_distinct() {
        assert_ne!(RouteKey::from("http://proxy-a:8080"), RouteKey::direct());
        assert_ne!(
            RouteKey::from("http://proxy-a:8080"),
            RouteKey::from("http://proxy-b:8080")
        );
    }

    #[test]
    fn test_sentinel_string_aliases_direct() {
        let key = RouteKey::from_proxy(Some(NO_PROXY_KEY));
        assert!(key.is_direct());
        assert_eq!(key.proxy_url(), None);
        assert!(validate_proxy_url(NO_PROXY_KEY).is_err());
    }

    #[test]
    fn test_validate_proxy_url() {
        assert_eq!(
            validate_proxy_url(" socks5://user:pw@10.0.0.1:1080 ").unwrap(),
            "socks5://user:pw@10.0.0.1:1080"
        );
        assert!(validate_proxy_url("http://proxy:3128").is_ok());
        assert!(validate_proxy_url("").is_err());
        assert!(validate_proxy_url("ftp://proxy:21").is_err());
        assert!(validate_proxy_url("not a url").is_err());
    }

    proptest! {
        #[test]
        fn prop_whitespace_never_changes_key(
            url in "[a-z]{1,12}://[a-z0-9.]{1,20}:[0-9]{2,5}",
            pad in " {0,4}",
        ) {
            let padded = format!("{pad}{url}{pad}");
            prop_assert_eq!(RouteKey::from_proxy(Some(&padded)), RouteKey::from_proxy(Some(&url)));
        }

        #[test]
        fn prop_proxy_url_round_trips(url in "[a-z]{1,12}://[a-z0-9.]{1,20}:[0-9]{2,5}") {
            let key = RouteKey::from_proxy(Some(&url));
            prop_assert_eq!(key.proxy_url(), Some(url.as_str()));
            prop_assert!(!key.is_direct());
        }
    }
}
