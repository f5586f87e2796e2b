//! In-memory clearance cache with double-checked, per-route acquisition.

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use clearance_core::constants::DEFAULT_TTL_SECONDS;
use clearance_core::error::{ClearanceError, Result};
use clearance_core::traits::{Acquirer, RouteConfigProvider};
use clearance_core::types::{Clearance, ClientId, RouteKey};

use crate::lock::LockRegistry;

/// Cache entry with its acquisition time.
#[derive(Clone)]
struct CacheEntry {
    clearance: Clearance,
    acquired_at: Instant,
    obtained_at: DateTime<Utc>,
}

impl CacheEntry {
    fn new(clearance: Clearance) -> Self {
        Self {
            clearance,
            acquired_at: Instant::now(),
            obtained_at: Utc::now(),
        }
    }

    fn is_valid(&self, ttl: Duration) -> bool {
        self.acquired_at.elapsed() < ttl
    }
}

/// Cache configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// How long an acquired clearance stays valid, in seconds
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_TTL_SECONDS,
        }
    }
}

impl CacheConfig {
    /// Creates a config with the given TTL.
    pub fn with_ttl_seconds(ttl_seconds: u64) -> Self {
        Self { ttl_seconds }
    }

    /// The TTL as a `Duration`.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    coalesced: AtomicU64,
    acquisitions: AtomicU64,
    failures: AtomicU64,
}

/// Per-route clearance cache.
///
/// Owns the entry map and the lock registry. Share one instance (behind an
/// `Arc`) between every caller that needs clearance.
///
/// # Protocol
///
/// 1. A valid entry is returned immediately, without taking any lock.
/// 2. Otherwise the route's lock is taken and validity is checked again, so
///    callers queued behind an acquisition reuse its result.
/// 3. Still invalid, or `force_refresh`: the [`Acquirer`] runs once under the
///    lock. Success replaces the entry; failure leaves the map untouched.
///
/// Locks are released on every exit path, including a panicking acquirer
/// (reported as [`ClearanceError::AcquisitionFailed`]) and a cancelled caller.
pub struct KeyedClearanceCache {
    entries: RwLock<HashMap<RouteKey, CacheEntry>>,
    locks: LockRegistry,
    acquirer: Arc<dyn Acquirer>,
    routes: Option<Arc<dyn RouteConfigProvider>>,
    config: CacheConfig,
    counters: Counters,
}

impl KeyedClearanceCache {
    /// Creates a cache with the default TTL.
    pub fn new(acquirer: Arc<dyn Acquirer>) -> Self {
        Self::with_config(acquirer, CacheConfig::default())
    }

    /// Creates a cache with custom configuration.
    pub fn with_config(acquirer: Arc<dyn Acquirer>, config: CacheConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            locks: LockRegistry::new(),
            acquirer,
            routes: None,
            config,
            counters: Counters::default(),
        }
    }

    /// Attaches the provider used by [`get_for_client`](Self::get_for_client).
    pub fn with_route_provider(mut self, routes: Arc<dyn RouteConfigProvider>) -> Self {
        self.routes = Some(routes);
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns clearance for `route`, acquiring it if needed.
    ///
    /// With `force_refresh` the cached entry is ignored and a new acquisition
    /// always runs, still serialized with other acquisitions for the route.
    #[instrument(skip(self, route), fields(route = %route))]
    pub async fn get(&self, route: &RouteKey, force_refresh: bool) -> Result<Clearance> {
        if !force_refresh {
            if let Some(clearance) = self.lookup_valid(route) {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                debug!("Cache hit");
                return Ok(clearance);
            }
        }

        let lock = self.locks.lock_for(route);
        let _guard = lock.lock().await;

        // Another caller may have finished an acquisition while we waited.
        if !force_refresh {
            if let Some(clearance) = self.lookup_valid(route) {
                self.counters.coalesced.fetch_add(1, Ordering::Relaxed);
                debug!("Reusing clearance acquired while waiting");
                return Ok(clearance);
            }
        }

        info!(force_refresh, "Acquiring clearance");
        self.counters.acquisitions.fetch_add(1, Ordering::Relaxed);
        let started = Instant::now();

        let outcome = AssertUnwindSafe(self.acquirer.acquire(route))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                Err(ClearanceError::acquisition_failed(
                    route.as_str(),
                    format!("acquirer panicked: {}", panic_message(&*panic)),
                ))
            });

        match outcome {
            Ok(clearance) => {
                self.entries
                    .write()
                    .insert(route.clone(), CacheEntry::new(clearance.clone()));
                info!(
                    values = clearance.len(),
                    names = ?clearance.value_names(),
                    ttl_seconds = self.config.ttl_seconds,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Cached clearance"
                );
                Ok(clearance)
            }
            Err(err) => {
                self.counters.failures.fetch_add(1, Ordering::Relaxed);
                if err.is_unavailable() {
                    warn!(error = %err, "No acquisition mechanism available");
                } else {
                    warn!(
                        error = %err,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Failed to obtain clearance"
                    );
                }
                Err(err)
            }
        }
    }

    /// Returns clearance for an optional proxy URL (`None` means direct).
    pub async fn get_for_proxy(
        &self,
        proxy_url: Option<&str>,
        force_refresh: bool,
    ) -> Result<Clearance> {
        self.get(&RouteKey::from_proxy(proxy_url), force_refresh).await
    }

    /// Returns clearance for a logical client, resolving its route first.
    pub async fn get_for_client(
        &self,
        client_id: Option<ClientId>,
        force_refresh: bool,
    ) -> Result<Clearance> {
        let route = self.resolve_route(client_id).await?;
        self.get(&route, force_refresh).await
    }

    /// Resolves the route a client uses.
    ///
    /// Without a route provider every client goes direct.
    pub async fn resolve_route(&self, client_id: Option<ClientId>) -> Result<RouteKey> {
        match &self.routes {
            Some(routes) => {
                let proxy_url = routes.resolve_route(client_id).await?;
                Ok(RouteKey::from_proxy(proxy_url.as_deref()))
            }
            None => Ok(RouteKey::direct()),
        }
    }

    /// Returns the cached clearance for `route` if it is still valid.
    ///
    /// Never acquires.
    pub fn peek(&self, route: &RouteKey) -> Option<Clearance> {
        self.lookup_valid(route)
    }

    /// Returns true if `route` has a valid entry.
    pub fn is_valid(&self, route: &RouteKey) -> bool {
        let ttl = self.config.ttl();
        self.entries
            .read()
            .get(route)
            .map_or(false, |entry| entry.is_valid(ttl))
    }

    /// Removes the entry for `route`.
    ///
    /// Idempotent; the route's lock is kept. Returns true if an entry was removed.
    pub fn invalidate(&self, route: &RouteKey) -> bool {
        let removed = self.entries.write().remove(route).is_some();
        if removed {
            info!(route = %route, "Clearance invalidated");
        }
        removed
    }

    /// Removes every entry. Locks are kept.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate_all(&self) -> usize {
        let cleared = {
            let mut entries = self.entries.write();
            let count = entries.len();
            entries.clear();
            count
        };
        info!(cleared, "All clearances invalidated");
        cleared
    }

    /// Number of entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        let ttl = self.config.ttl();
        let entries = self.entries.read();
        let valid = entries.values().filter(|e| e.is_valid(ttl)).count();

        CacheStats {
            total_entries: entries.len(),
            valid_entries: valid,
            expired_entries: entries.len() - valid,
            tracked_locks: self.locks.len(),
            hits: self.counters.hits.load(Ordering::Relaxed),
            coalesced: self.counters.coalesced.load(Ordering::Relaxed),
            acquisitions: self.counters.acquisitions.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
            ttl_seconds: self.config.ttl_seconds,
        }
    }

    /// Describes every cached entry, sorted by route. Values are omitted.
    pub fn snapshot(&self) -> Vec<CachedClearanceInfo> {
        let ttl = self.config.ttl();
        let entries = self.entries.read();

        let mut infos: Vec<CachedClearanceInfo> = entries
            .iter()
            .map(|(route, entry)| {
                let age = entry.acquired_at.elapsed();
                CachedClearanceInfo {
                    route: route.clone(),
                    value_names: entry.clearance.value_names(),
                    identity: entry.clearance.identity.clone(),
                    obtained_at: entry.obtained_at,
                    age_seconds: age.as_secs(),
                    expires_in_seconds: ttl.saturating_sub(age).as_secs(),
                    valid: entry.is_valid(ttl),
                }
            })
            .collect();
        infos.sort_by(|a, b| a.route.cmp(&b.route));
        infos
    }

    fn lookup_valid(&self, route: &RouteKey) -> Option<Clearance> {
        let ttl = self.config.ttl();
        let entries = self.entries.read();
        entries
            .get(route)
            .filter(|entry| entry.is_valid(ttl))
            .map(|entry| entry.clearance.clone())
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Cache statistics.
#[derive(Clone, Debug, Serialize)]
pub struct CacheStats {
    /// Total entries (including expired)
    pub total_entries: usize,
    /// Entries still within their TTL
    pub valid_entries: usize,
    /// Entries past their TTL awaiting refresh
    pub expired_entries: usize,
    /// Routes with a lock in the registry
    pub tracked_locks: usize,
    /// Lock-free hits
    pub hits: u64,
    /// Callers served by an acquisition they waited on
    pub coalesced: u64,
    /// Acquirer invocations
    pub acquisitions: u64,
    /// Acquirer invocations that failed
    pub failures: u64,
    /// Configured TTL
    pub ttl_seconds: u64,
}

/// Description of one cached entry.
#[derive(Clone, Debug, Serialize)]
pub struct CachedClearanceInfo {
    /// Route the entry belongs to
    pub route: RouteKey,
    /// Names of the cached values
    pub value_names: Vec<String>,
    /// Identity bound to the values
    pub identity: String,
    /// Wall-clock acquisition time
    pub obtained_at: DateTime<Utc>,
    /// Seconds since acquisition
    pub age_seconds: u64,
    /// Seconds until the entry expires (0 once expired)
    pub expires_in_seconds: u64,
    /// Whether the entry is still within its TTL
    pub valid: bool,
}
