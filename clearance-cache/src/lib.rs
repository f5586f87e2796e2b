//! # Clearance Cache
//!
//! Keyed cache for short-lived clearance credentials.
//!
//! Each route (a proxy URL or the direct sentinel) owns one cache entry and one
//! async lock. Valid entries are served without touching any lock; misses funnel
//! through the route's lock so that concurrent callers share a single
//! acquisition.
//!
//! ## Example
//!
//! ```rust,ignore
//! use clearance_cache::{CacheConfig, KeyedClearanceCache};
//!
//! let cache = KeyedClearanceCache::with_config(acquirer, CacheConfig::default());
//! let clearance = cache.get_for_proxy(Some("http://proxy-a:8080"), false).await?;
//! request.header("Cookie", clearance.cookie_header())
//!        .header("User-Agent", &clearance.identity);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod cache;
mod lock;

pub use cache::{CacheConfig, CacheStats, CachedClearanceInfo, KeyedClearanceCache};
pub use lock::LockRegistry;
