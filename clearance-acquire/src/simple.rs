//! Small acquirer adapters.

use std::future::Future;

use async_trait::async_trait;

use clearance_core::error::{ClearanceError, Result};
use clearance_core::traits::Acquirer;
use clearance_core::types::{Clearance, RouteKey};

/// [`Acquirer`] for deployments without an acquisition mechanism.
///
/// Every attempt fails with [`ClearanceError::AcquisitionUnavailable`].
#[derive(Clone, Debug)]
pub struct UnavailableAcquirer {
    reason: String,
}

impl UnavailableAcquirer {
    /// Creates an acquirer that reports `reason`.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Default for UnavailableAcquirer {
    fn default() -> Self {
        Self::new("no acquisition helper configured")
    }
}

#[async_trait]
impl Acquirer for UnavailableAcquirer {
    async fn acquire(&self, _route: &RouteKey) -> Result<Clearance> {
        Err(ClearanceError::AcquisitionUnavailable(self.reason.clone()))
    }
}

/// [`Acquirer`] backed by an async closure.
///
/// ```rust,ignore
/// let acquirer = FnAcquirer::new(|route: RouteKey| async move {
///     Ok(Clearance::new([("token", route.to_string())], "UA-1"))
/// });
/// ```
pub struct FnAcquirer<F> {
    f: F,
}

impl<F> FnAcquirer<F> {
    /// Wraps `f`.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> Acquirer for FnAcquirer<F>
where
    F: Fn(RouteKey) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Clearance>> + Send + 'static,
{
    async fn acquire(&self, route: &RouteKey) -> Result<Clearance> {
        (self.f)(route.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unavailable() {
        let err = UnavailableAcquirer::default()
            .acquire(&RouteKey::direct())
            .await
            .unwrap_err();

        assert!(err.is_unavailable());
        assert!(err.to_string().contains("no acquisition helper"));
    }

    #[tokio::test]
    async fn test_fn_acquirer_sees_route() {
        let acquirer = FnAcquirer::new(|route: RouteKey| async move {
            Ok(Clearance::new([("route", route.to_string())], "UA-1"))
        });

        let clearance = acquirer.acquire(&RouteKey::from("http://proxy-a:8080")).await.unwrap();
        assert_eq!(clearance.get("route"), Some("http://proxy-a:8080"));
    }
}
