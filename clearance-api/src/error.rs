//! API error handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use clearance_core::error::ClearanceError;

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    code: String,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(status: StatusCode, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: code.into(),
        }
    }

    /// Bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, "BAD_REQUEST")
    }

    /// Internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message, "INTERNAL_ERROR")
    }

    /// Returns the HTTP status.
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

/// Error response body.
#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code,
                message: self.message,
            },
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<ClearanceError> for ApiError {
    fn from(err: ClearanceError) -> Self {
        match &err {
            ClearanceError::AcquisitionUnavailable(_) => {
                ApiError::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    err.to_string(),
                    "ACQUISITION_UNAVAILABLE",
                )
            }
            ClearanceError::AcquisitionFailed { .. } => {
                ApiError::new(StatusCode::BAD_GATEWAY, err.to_string(), "ACQUISITION_FAILED")
            }
            ClearanceError::AcquisitionTimeout { .. } => {
                ApiError::new(StatusCode::GATEWAY_TIMEOUT, err.to_string(), "ACQUISITION_TIMEOUT")
            }
            ClearanceError::InvalidProxyUrl(_) => ApiError::bad_request(err.to_string()),
            ClearanceError::RouteLookupFailed(_) => {
                ApiError::new(StatusCode::BAD_GATEWAY, err.to_string(), "ROUTE_LOOKUP_FAILED")
            }
            _ => {
                tracing::error!(error = %err, "Internal error");
                ApiError::internal("An internal error occurred")
            }
        }
    }
}
