//! Classified outcomes of upstream calls

use serde::Serialize;
use thiserror::Error;

/// Failure of a single attempt against the completion API.
///
/// The executor produces exactly one of these per attempt; the proxy
/// fallback is resolved inside the executor, so a `Proxy` failure only
/// escapes when the direct retry could not be made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// The configured proxy refused or dropped the connection
    #[error("proxy connection failed: {message}")]
    Proxy { message: String },

    /// The completion API answered with a non-2xx status
    #[error("completion API returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// No transport connection could be established
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// The call exceeded its time bound
    #[error("request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// A 2xx response whose body lacks the expected answer
    #[error("malformed completion response: {message}")]
    MalformedResponse { message: String },
}

/// Discriminant of [`TransportFailure`], used for logging and mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Proxy,
    HttpStatus,
    Connection,
    Timeout,
    MalformedResponse,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Proxy => "proxy",
            Self::HttpStatus => "http_status",
            Self::Connection => "connection",
            Self::Timeout => "timeout",
            Self::MalformedResponse => "malformed_response",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TransportFailure {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Proxy { .. } => FailureKind::Proxy,
            Self::HttpStatus { .. } => FailureKind::HttpStatus,
            Self::Connection { .. } => FailureKind::Connection,
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::MalformedResponse { .. } => FailureKind::MalformedResponse,
        }
    }

    /// Whether another attempt may succeed. Everything except a malformed
    /// success body is retried.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::MalformedResponse { .. })
    }
}

/// What was being sent when a failure happened.
///
/// Carries counts only; message content and credentials stay out of logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayloadSummary {
    pub model: String,
    pub message_count: usize,
    pub last_message_chars: usize,
}

impl std::fmt::Display for PayloadSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "model={} messages={} last_message_chars={}",
            self.model, self.message_count, self.last_message_chars
        )
    }
}

/// A [`TransportFailure`] stamped with the attempt that produced it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("attempt {attempt}: {failure}")]
pub struct ClassifiedFailure {
    pub failure: TransportFailure,
    pub attempt: u32,
    pub payload: PayloadSummary,
}

impl ClassifiedFailure {
    pub fn new(failure: TransportFailure, attempt: u32, payload: PayloadSummary) -> Self {
        Self {
            failure,
            attempt,
            payload,
        }
    }

    pub fn kind(&self) -> FailureKind {
        self.failure.kind()
    }
}

/// Terminal outcome of the retry loop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RetryError {
    /// Every attempt in the budget failed with a retryable failure
    #[error("gave up after {attempts} attempts, last failure on {last}")]
    Exhausted {
        attempts: u32,
        last: ClassifiedFailure,
    },

    /// A failure that must not be retried
    #[error("non-retryable failure on {0}")]
    Fatal(ClassifiedFailure),
}

impl RetryError {
    /// The failure that ended the loop
    pub fn last_failure(&self) -> &ClassifiedFailure {
        match self {
            Self::Exhausted { last, .. } => last,
            Self::Fatal(failure) => failure,
        }
    }
}
