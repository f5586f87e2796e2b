//! Deadline wrapper for acquirers.

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use clearance_core::error::{ClearanceError, Result};
use clearance_core::traits::Acquirer;
use clearance_core::types::{Clearance, RouteKey};

/// Bounds every attempt of the inner acquirer by `timeout`.
///
/// An overrun drops the inner attempt and reports
/// [`ClearanceError::AcquisitionTimeout`].
pub struct TimeoutAcquirer<A> {
    inner: A,
    timeout: Duration,
}

impl<A> TimeoutAcquirer<A> {
    /// Wraps `inner` with the given deadline.
    pub fn new(inner: A, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    /// Returns the deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl<A: Acquirer> Acquirer for TimeoutAcquirer<A> {
    async fn acquire(&self, route: &RouteKey) -> Result<Clearance> {
        match tokio::time::timeout(self.timeout, self.inner.acquire(route)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    route = %route,
                    timeout_seconds = self.timeout.as_secs(),
                    "Acquisition timed out"
                );
                Err(ClearanceError::AcquisitionTimeout {
                    route: route.to_string(),
                    seconds: self.timeout.as_secs(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simple::FnAcquirer;

    fn slow(delay: Duration) -> impl Acquirer {
        FnAcquirer::new(move |_route: RouteKey| async move {
            tokio::time::sleep(delay).await;
            Ok(Clearance::new([("cf_clearance", "late")], "UA-1"))
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_reported() {
        let acquirer =
            TimeoutAcquirer::new(slow(Duration::from_secs(120)), Duration::from_secs(90));

        let err = acquirer.acquire(&RouteKey::direct()).await.unwrap_err();

        assert!(matches!(err, ClearanceError::AcquisitionTimeout { seconds: 90, .. }));
        assert!(err.is_recoverable());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_acquisition_passes_through() {
        let acquirer = TimeoutAcquirer::new(slow(Duration::from_secs(5)), Duration::from_secs(90));

        let clearance = acquirer.acquire(&RouteKey::direct()).await.unwrap();

        assert_eq!(clearance.get("cf_clearance"), Some("late"));
        assert_eq!(acquirer.timeout(), Duration::from_secs(90));
    }
}
