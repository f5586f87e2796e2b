//! Per-route lock registry.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use clearance_core::types::RouteKey;

/// Lazily created async locks, one per route.
///
/// A lock is created on first use through an atomic get-or-create on the
/// underlying map and is never removed, so every caller contending on a route
/// observes the same instance. Growth is bounded by the number of distinct
/// routes ever seen.
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: DashMap<RouteKey, Arc<Mutex<()>>>,
}

impl LockRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lock for `route`, creating it if needed.
    pub fn lock_for(&self, route: &RouteKey) -> Arc<Mutex<()>> {
        if let Some(lock) = self.locks.get(route) {
            return lock.value().clone();
        }
        self.locks
            .entry(route.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone()
    }

    /// Returns true if a lock has been created for `route`.
    pub fn contains(&self, route: &RouteKey) -> bool {
        self.locks.contains_key(route)
    }

    /// Number of routes with a lock.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Returns true if no lock has been created yet.
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
