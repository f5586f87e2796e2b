//! Error types for the clearance cache.
//!
//! Every failure degrades to "no credentials for this route right now"; none of
//! these errors is fatal to the process. Callers decide whether to retry, fall
//! back to a direct connection, or give up.

use thiserror::Error;

/// Result type alias using `ClearanceError`.
pub type Result<T> = std::result::Result<T, ClearanceError>;

/// Main error type for all clearance operations.
#[derive(Debug, Error)]
pub enum ClearanceError {
    // ═══════════════════════════════════════════════════════════════════════════
    // ACQUISITION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The acquisition mechanism cannot run at all (not installed or not configured).
    ///
    /// Permanent until the process is reconfigured.
    #[error("Acquisition unavailable: {0}")]
    AcquisitionUnavailable(String),

    /// A single acquisition attempt produced no usable result.
    #[error("Acquisition failed for route '{route}': {reason}")]
    AcquisitionFailed { route: String, reason: String },

    /// A single acquisition attempt ran past its deadline.
    #[error("Acquisition for route '{route}' timed out after {seconds}s")]
    AcquisitionTimeout { route: String, seconds: u64 },

    // ═══════════════════════════════════════════════════════════════════════════
    // ROUTE CONFIGURATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The route configuration could not be read.
    #[error("Route lookup failed: {0}")]
    RouteLookupFailed(String),

    /// A proxy URL was rejected.
    #[error("Invalid proxy URL: {0}")]
    InvalidProxyUrl(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // IO & SERIALIZATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Internal invariant violation (should never happen).
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ClearanceError {
    /// Shorthand for [`ClearanceError::AcquisitionFailed`].
    pub fn acquisition_failed(route: impl Into<String>, reason: impl Into<String>) -> Self {
        ClearanceError::AcquisitionFailed {
            route: route.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if a later attempt may succeed without reconfiguration.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ClearanceError::AcquisitionFailed { .. }
                | ClearanceError::AcquisitionTimeout { .. }
                | ClearanceError::RouteLookupFailed(_)
                | ClearanceError::IoError(_)
        )
    }

    /// Returns true if no acquisition mechanism is available.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ClearanceError::AcquisitionUnavailable(_))
    }

    /// Returns true if this error came out of an acquisition attempt.
    pub fn is_acquisition_error(&self) -> bool {
        matches!(
            self,
            ClearanceError::AcquisitionUnavailable(_)
                | ClearanceError::AcquisitionFailed { .. }
                | ClearanceError::AcquisitionTimeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClearanceError::AcquisitionTimeout {
            route: "http://proxy-a:8080".into(),
            seconds: 90,
        };
        assert!(err.to_string().contains("proxy-a"));
        assert!(err.to_string().contains("90s"));
    }

    #[test]
    fn test_error_classification() {
        assert!(ClearanceError::acquisition_failed("r", "no cookies").is_recoverable());
        let timeout = ClearanceError::AcquisitionTimeout {
            route: "r".into(),
            seconds: 1,
        };
        assert!(timeout.is_recoverable());
        assert!(!ClearanceError::AcquisitionUnavailable("missing".into()).is_recoverable());

        assert!(ClearanceError::AcquisitionUnavailable("missing".into()).is_unavailable());
        assert!(!ClearanceError::acquisition_failed("r", "x").is_unavailable());

        assert!(ClearanceError::acquisition_failed("r", "x").is_acquisition_error());
        assert!(!ClearanceError::InvalidProxyUrl("x".into()).is_acquisition_error());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_result: std::result::Result<serde_json::Value, _> =
            serde_json::from_str("invalid");
        let result: Result<serde_json::Value> = json_result.map_err(ClearanceError::from);
        assert!(matches!(result, Err(ClearanceError::JsonError(_))));
    }
}
