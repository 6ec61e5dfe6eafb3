/// Unified error types for the Terrabaq gateway
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Malformed inbound payload
    #[error("Decode error: {0}")]
    Decode(String),

    /// Authorizer unreachable, timed out, returned non-success or garbage
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Token or identity not present in the session store
    #[error("Invalid session: {0}")]
    InvalidSession(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error body returned to callers
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            GatewayError::Decode(_) => (
                StatusCode::BAD_REQUEST,
                "InvalidRequest",
                self.to_string(),
            ),
            GatewayError::InvalidSession(_) => (
                StatusCode::UNAUTHORIZED,
                "InvalidSession",
                self.to_string(),
            ),
            GatewayError::Upstream(_) => (
                StatusCode::BAD_GATEWAY,
                "UpstreamError",
                self.to_string(),
            ),
            GatewayError::Internal(_) | GatewayError::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalServerError",
                "Internal server error".to_string(), // Don't leak details
            ),
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;
