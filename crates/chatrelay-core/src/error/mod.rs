//! Error types for chatrelay
//!
//! Three layers of errors flow through the relay:
//! - [`TransportFailure`]: the classified outcome of a single upstream attempt
//! - [`ClassifiedFailure`] / [`RetryError`]: what the retry loop reports after
//!   stamping each failure with its attempt number and payload summary
//! - [`UserFacingError`]: what a caller of the conversation pipeline sees,
//!   already mapped to a status code and a safe message
//!
//! [`RelayError`] covers everything outside the request path (configuration,
//! HTTP client construction, IO).

mod constructors;
mod conversions;
mod failure;
mod types;
mod user_messages;

pub use failure::{ClassifiedFailure, FailureKind, PayloadSummary, RetryError, TransportFailure};
pub use types::{RelayError, RelayResult};
pub use user_messages::{ErrorCategory, UserFacingError, ValidationReason};
