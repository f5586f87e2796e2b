//! # Clearance Route
//!
//! Decides which upstream route (proxy or direct) a logical client uses.
//!
//! - [`ProxyManager`]: per-client override, then the global proxy, then direct
//! - [`MemoryProxyStore`]: in-memory [`ProxyConfigStore`] for development and tests
//!
//! ## Example
//!
//! ```rust,ignore
//! use clearance_route::{MemoryProxyStore, ProxyManager};
//!
//! let manager = ProxyManager::new(Arc::new(MemoryProxyStore::new()));
//! manager.update_proxy_config(true, Some("http://proxy:3128")).await?;
//! assert_eq!(manager.proxy_url(None).await?, Some("http://proxy:3128".into()));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod memory;
mod proxy;

pub use memory::MemoryProxyStore;
pub use proxy::ProxyManager;

// Re-export the traits from core
pub use clearance_core::traits::{ProxyConfigStore, RouteConfigProvider};
