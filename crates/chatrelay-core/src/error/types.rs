//! Core error type for chatrelay

use thiserror::Error;

/// Result type alias for chatrelay operations
pub type RelayResult<T> = Result<T, RelayError>;

/// Errors raised outside the per-request pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },

    /// HTTP client could not be built
    #[error("HTTP client error: {message}")]
    HttpClient { message: String },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<String>,
    },

    /// Invalid input errors
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        field: Option<String>,
    },
}

impl RelayError {
    /// Stable code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "RELAY_CONFIG",
            Self::HttpClient { .. } => "RELAY_HTTP_CLIENT",
            Self::Io { .. } => "RELAY_IO",
            Self::InvalidInput { .. } => "RELAY_INVALID_INPUT",
        }
    }
}
