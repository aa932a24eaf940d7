//! User-facing errors and their status mapping
//!
//! Everything the conversation pipeline can return to a caller ends up here,
//! with an HTTP-style status, a short title and details that are safe to show.

use super::failure::{RetryError, TransportFailure};
use super::types::RelayError;
use thiserror::Error;

/// Error category for user-facing messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Invalid user input
    UserInput,
    /// Missing credential or session
    Authentication,
    /// Proxy or network connectivity issues
    Network,
    /// The completion API rejected the request
    Upstream,
    /// Internal system errors
    Internal,
}

impl ErrorCategory {
    /// Get a user-friendly category name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::UserInput => "Invalid Input",
            Self::Authentication => "Authentication Error",
            Self::Network => "Network Error",
            Self::Upstream => "Upstream Error",
            Self::Internal => "Internal Error",
        }
    }
}

/// Why a request was rejected before touching any state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationReason {
    EmptyQuestion,
    MissingCredential,
    MissingSession,
    InvalidCredentialFormat,
}

impl ValidationReason {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::EmptyQuestion | Self::InvalidCredentialFormat => 400,
            Self::MissingCredential | Self::MissingSession => 401,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::EmptyQuestion => "question must not be empty",
            Self::MissingCredential => "api key must not be empty",
            Self::MissingSession => "invalid session, please sign in again",
            Self::InvalidCredentialFormat => "invalid api key format",
        }
    }
}

/// Error returned to callers of the conversation pipeline
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UserFacingError {
    /// Rejected input; nothing was recorded
    #[error("{}", .0.message())]
    Validation(ValidationReason),

    /// The completion API could not produce an answer
    #[error("{error}: {details}")]
    Upstream {
        status: u16,
        category: ErrorCategory,
        error: String,
        details: String,
    },

    /// Anything not otherwise classified; details carry a message string only
    #[error("unexpected error: {details}")]
    Unexpected { details: String },
}

impl UserFacingError {
    pub fn validation(reason: ValidationReason) -> Self {
        Self::Validation(reason)
    }

    pub fn unexpected(details: impl std::fmt::Display) -> Self {
        Self::Unexpected {
            details: details.to_string(),
        }
    }

    /// HTTP status a web layer should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(reason) => reason.status_code(),
            Self::Upstream { status, .. } => *status,
            Self::Unexpected { .. } => 500,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(ValidationReason::EmptyQuestion)
            | Self::Validation(ValidationReason::InvalidCredentialFormat) => {
                ErrorCategory::UserInput
            }
            Self::Validation(_) => ErrorCategory::Authentication,
            Self::Upstream { category, .. } => *category,
            Self::Unexpected { .. } => ErrorCategory::Internal,
        }
    }

    /// Short headline, the `error` field of a JSON error body
    pub fn title(&self) -> String {
        match self {
            Self::Validation(reason) => reason.message().to_string(),
            Self::Upstream { error, .. } => error.clone(),
            Self::Unexpected { .. } => "unexpected error".to_string(),
        }
    }

    /// Longer explanation, the `details` field of a JSON error body
    pub fn details(&self) -> Option<String> {
        match self {
            Self::Validation(_) => None,
            Self::Upstream { details, .. } => Some(details.clone()),
            Self::Unexpected { details } => Some(details.clone()),
        }
    }
}

impl From<RetryError> for UserFacingError {
    fn from(error: RetryError) -> Self {
        let failure = &error.last_failure().failure;
        let (status, category, title, details) = match failure {
            TransportFailure::Proxy { .. } => (
                503,
                ErrorCategory::Network,
                "proxy connection failed",
                "a proxy error occurred while contacting the completion API; check the proxy \
                 settings or connect directly"
                    .to_string(),
            ),
            TransportFailure::HttpStatus { status, body } => (
                503,
                ErrorCategory::Upstream,
                "completion API returned an error",
                format!("HTTP status: {}, response: {}", status, body),
            ),
            TransportFailure::Connection { .. } => (
                503,
                ErrorCategory::Network,
                "connection error",
                "could not connect to the completion API; check the network or proxy settings"
                    .to_string(),
            ),
            TransportFailure::Timeout { .. } => (
                504,
                ErrorCategory::Network,
                "request timed out",
                "the completion API did not answer in time, please try again later".to_string(),
            ),
            TransportFailure::MalformedResponse { message } => {
                return Self::Unexpected {
                    details: format!("unreadable completion response: {}", message),
                };
            }
        };

        Self::Upstream {
            status,
            category,
            error: title.to_string(),
            details,
        }
    }
}

impl From<RelayError> for UserFacingError {
    fn from(error: RelayError) -> Self {
        Self::unexpected(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ClassifiedFailure, PayloadSummary};

    fn exhausted(failure: TransportFailure) -> RetryError {
        RetryError::Exhausted {
            attempts: 3,
            last: ClassifiedFailure::new(
                failure,
                3,
                PayloadSummary {
                    model: "deepseek-chat".into(),
                    message_count: 1,
                    last_message_chars: 5,
                },
            ),
        }
    }

    #[test]
    fn test_validation_status_codes() {
        assert_eq!(
            UserFacingError::validation(ValidationReason::EmptyQuestion).status_code(),
            400
        );
        assert_eq!(
            UserFacingError::validation(ValidationReason::MissingCredential).status_code(),
            401
        );
        assert_eq!(
            UserFacingError::validation(ValidationReason::MissingSession).status_code(),
            401
        );
        assert_eq!(
            UserFacingError::validation(ValidationReason::InvalidCredentialFormat).status_code(),
            400
        );
    }

    #[test]
    fn test_exhausted_http_status_carries_remote_status_and_body() {
        let err: UserFacingError = exhausted(TransportFailure::HttpStatus {
            status: 502,
            body: "bad gateway".into(),
        })
        .into();

        assert_eq!(err.status_code(), 503);
        assert_eq!(err.category(), ErrorCategory::Upstream);
        assert_eq!(
            err.details().as_deref(),
            Some("HTTP status: 502, response: bad gateway")
        );
    }

    #[test]
    fn test_exhausted_transport_failures_map_to_503_or_504() {
        let proxy: UserFacingError = exhausted(TransportFailure::Proxy {
            message: "x".into(),
        })
        .into();
        assert_eq!(proxy.status_code(), 503);
        assert_eq!(proxy.title(), "proxy connection failed");

        let connection: UserFacingError = exhausted(TransportFailure::Connection {
            message: "x".into(),
        })
        .into();
        assert_eq!(connection.status_code(), 503);

        let timeout: UserFacingError = exhausted(TransportFailure::Timeout { seconds: 120 }).into();
        assert_eq!(timeout.status_code(), 504);
        assert_eq!(timeout.category(), ErrorCategory::Network);
    }

    #[test]
    fn test_malformed_response_is_internal() {
        let err: UserFacingError = RetryError::Fatal(ClassifiedFailure::new(
            TransportFailure::MalformedResponse {
                message: "missing choices".into(),
            },
            1,
            PayloadSummary {
                model: "deepseek-chat".into(),
                message_count: 1,
                last_message_chars: 2,
            },
        ))
        .into();

        assert_eq!(err.status_code(), 500);
        assert!(err.details().unwrap_or_default().contains("missing choices"));
    }

    #[test]
    fn test_relay_error_becomes_unexpected() {
        let err: UserFacingError = RelayError::config("bad port").into();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.title(), "unexpected error");
    }
}
