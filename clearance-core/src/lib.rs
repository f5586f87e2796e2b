//! # Clearance Core
//!
//! Core types, errors, and traits shared by every clearance crate.
//!
//! - **Types**: route keys, clearance credentials, proxy configuration
//! - **Errors**: the acquisition error taxonomy
//! - **Constants**: TTL defaults, the direct-route sentinel, the default identity
//! - **Traits**: the [`Acquirer`], [`RouteConfigProvider`] and [`ProxyConfigStore`] seams
//!
//! ## Example
//!
//! ```rust
//! use clearance_core::{Clearance, RouteKey};
//!
//! let route = RouteKey::from_proxy(None);
//! assert!(route.is_direct());
//!
//! let clearance = Clearance::new([("cf_clearance", "abc")], "UA-1");
//! assert_eq!(clearance.cookie_header(), "cf_clearance=abc");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{ClearanceError, Result};
pub use traits::*;
pub use types::*;
