//! Domain types for the clearance cache.
//!
//! - [`RouteKey`]: normalized cache partition key (a proxy URL or the direct sentinel)
//! - [`Clearance`]: named credential values plus the identity they are bound to
//! - [`ProxyConfig`]: global proxy settings consumed by route resolution

mod clearance;
mod proxy;
mod route;

pub use clearance::*;
pub use proxy::*;
pub use route::*;
