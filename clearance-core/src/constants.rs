//! Defaults shared across the clearance crates.

// ═══════════════════════════════════════════════════════════════════════════════
// CACHE
// ═══════════════════════════════════════════════════════════════════════════════

/// Default lifetime of a cached clearance, in seconds (10 minutes).
pub const DEFAULT_TTL_SECONDS: u64 = 600;

/// Cache key used for requests that go out without a proxy.
///
/// Keeps "direct" and "via proxy X" in separate cache partitions. A proxy
/// string equal to this sentinel aliases the direct route; it never passes
/// [`validate_proxy_url`](crate::types::validate_proxy_url).
pub const NO_PROXY_KEY: &str = "__no_proxy__";

// ═══════════════════════════════════════════════════════════════════════════════
// ACQUISITION
// ═══════════════════════════════════════════════════════════════════════════════

/// Identity presented by the acquisition step when the helper reports none.
///
/// Clearance values are bound to the client identity that obtained them, so
/// callers must replay this exact string alongside the values.
pub const DEFAULT_IDENTITY: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Name of the value a successful challenge is expected to produce.
pub const DEFAULT_REQUIRED_VALUE: &str = "cf_clearance";

/// Default upper bound for a single acquisition attempt, in seconds.
///
/// Covers a 60s navigation plus the wait for the clearance value.
pub const DEFAULT_ACQUIRE_TIMEOUT_SECONDS: u64 = 90;

/// Environment variable carrying the proxy URL to an acquisition helper.
pub const PROXY_ENV_VAR: &str = "CLEARANCE_PROXY";

/// Proxy URL schemes accepted by the route configuration.
pub const SUPPORTED_PROXY_SCHEMES: &[&str] = &["http", "https", "socks4", "socks5", "socks5h"];
