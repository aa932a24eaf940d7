//! Error types for the HTTP layer.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chatrelay_core::{RelayError, UserFacingError};
use serde::Serialize;
use thiserror::Error;

/// Result type alias for server lifecycle operations.
pub type ServerResult<T> = std::result::Result<T, ServerError>;

/// Errors that stop the server from starting or running.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Invalid configuration or failed wiring of the pipeline.
    #[error("Configuration error: {0}")]
    Configuration(#[from] RelayError),

    /// The listen address could not be bound.
    #[error("Failed to bind to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// The accept loop failed.
    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Error response body for HTTP endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Failure of a single request, rendered as `{error, details}`.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Anything the conversation pipeline reported
    #[error(transparent)]
    User(#[from] UserFacingError),

    /// The body could not be decoded into the expected shape
    #[error("invalid request body: {0}")]
    BadRequest(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::User(error) => {
                let status = StatusCode::from_u16(error.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                if status.is_server_error() {
                    tracing::error!(status = status.as_u16(), error = %error, "request failed");
                }
                (
                    status,
                    ErrorResponse {
                        error: error.title(),
                        details: error.details(),
                    },
                )
            }
            Self::BadRequest(details) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "invalid request body".to_string(),
                    details: Some(details),
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatrelay_core::error::ValidationReason;

    #[test]
    fn test_error_response_without_details() {
        let resp = ErrorResponse {
            error: "question must not be empty".to_string(),
            details: None,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_validation_error_status() {
        let response =
            ApiError::from(UserFacingError::validation(ValidationReason::MissingSession))
                .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_upstream_error_status() {
        let error = UserFacingError::Upstream {
            status: 504,
            category: chatrelay_core::error::ErrorCategory::Network,
            error: "request timed out".into(),
            details: "try again later".into(),
        };
        let response = ApiError::from(error).into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_bind_error_display() {
        let err = ServerError::Bind {
            address: "127.0.0.1:5000".into(),
            source: std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use"),
        };
        assert_eq!(err.to_string(), "Failed to bind to 127.0.0.1:5000: in use");
    }
}
