//! # Clearance Acquire
//!
//! Ready-made [`Acquirer`](clearance_core::Acquirer) implementations.
//!
//! - [`CommandAcquirer`]: runs an external helper (e.g. a headless-browser
//!   script) and reads the clearance it prints as JSON
//! - [`TimeoutAcquirer`]: bounds any acquirer with a deadline
//! - [`UnavailableAcquirer`]: stands in when no mechanism is configured
//! - [`FnAcquirer`]: adapts an async closure

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod command;
mod simple;
mod timeout;

pub use command::{CommandAcquirer, CommandAcquirerConfig};
pub use simple::{FnAcquirer, UnavailableAcquirer};
pub use timeout::TimeoutAcquirer;
