//! Recovery from transient upstream failures
//!
//! - [`backoff`]: the wait schedule between attempts
//! - [`retry`]: the attempt loop around a [`RemoteCallExecutor`](crate::llm::RemoteCallExecutor)

pub mod backoff;
pub mod retry;

pub use backoff::{BackoffConfig, ExponentialBackoff};
pub use retry::{RetryConfig, RetryController};
