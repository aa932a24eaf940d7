//! Bounded retry loop around the completion executor
//!
//! The loop is an explicit state machine:
//!
//! ```text
//! Attempting(n) ──ok──────────────────────────────► Succeeded
//!      │ retryable failure, n < max ──► Waiting ──► Attempting(n + 1)
//!      │ retryable failure, n = max ──────────────► Exhausted
//!      └ non-retryable failure ───────────────────► Fatal
//! ```
//!
//! Waits between attempts are plain delays; they are not cancelled when the
//! caller goes away.

use super::backoff::{BackoffConfig, ExponentialBackoff};
use crate::config::proxy::ProxySettings;
use crate::config::timeouts;
use crate::error::{ClassifiedFailure, RetryError};
use crate::llm::executor::RemoteCallExecutor;
use crate::llm::payload::{ChatCompletionRequest, CompletionResponse};
use crate::session::Credential;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

/// Configuration for the retry loop
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Attempts in total, the first one included
    pub max_attempts: u32,
    /// Wait schedule between attempts
    pub backoff: BackoffConfig,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: timeouts::retry::MAX_ATTEMPTS,
            backoff: BackoffConfig {
                initial_delay: Duration::from_secs_f64(timeouts::retry::MIN_DELAY_SECS),
                max_delay: Duration::from_secs_f64(timeouts::retry::MAX_DELAY_SECS),
                multiplier: timeouts::retry::BACKOFF_FACTOR,
                jitter: false,
                jitter_ratio: 0.0,
            },
        }
    }
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }

    /// A single attempt, no waiting
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            backoff: BackoffConfig::with_initial_delay(Duration::ZERO).max_delay(Duration::ZERO),
        }
    }
}

enum AttemptState {
    Attempting(u32),
    Waiting { next: u32, delay: Duration },
    Succeeded { attempt: u32, response: CompletionResponse },
    Exhausted(ClassifiedFailure),
    Fatal(ClassifiedFailure),
}

/// Wraps a [`RemoteCallExecutor`] with bounded attempts and exponential backoff
pub struct RetryController {
    executor: Arc<dyn RemoteCallExecutor>,
    max_attempts: u32,
    backoff: ExponentialBackoff,
}

impl RetryController {
    pub fn new(executor: Arc<dyn RemoteCallExecutor>, config: RetryConfig) -> Self {
        Self {
            executor,
            max_attempts: config.max_attempts.max(1),
            backoff: ExponentialBackoff::with_config(config.backoff),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run the attempt loop for one payload.
    ///
    /// # Errors
    ///
    /// [`RetryError::Exhausted`] carries the last failure once the budget is
    /// spent; [`RetryError::Fatal`] is returned at once for a failure that
    /// must not be retried.
    #[instrument(skip_all, fields(max_attempts = self.max_attempts))]
    pub async fn call(
        &self,
        payload: &ChatCompletionRequest,
        credential: &Credential,
        proxy: &ProxySettings,
    ) -> Result<CompletionResponse, RetryError> {
        let summary = payload.summary();
        let mut state = AttemptState::Attempting(1);

        loop {
            state = match state {
                AttemptState::Attempting(attempt) => {
                    match self.executor.execute(payload, credential, proxy).await {
                        Ok(response) => AttemptState::Succeeded { attempt, response },
                        Err(failure) => self.on_failure(ClassifiedFailure::new(
                            failure,
                            attempt,
                            summary.clone(),
                        )),
                    }
                }
                AttemptState::Waiting { next, delay } => {
                    sleep(delay).await;
                    AttemptState::Attempting(next)
                }
                AttemptState::Succeeded { attempt, response } => {
                    if attempt > 1 {
                        info!(attempt, "request succeeded after retry");
                    }
                    return Ok(response);
                }
                AttemptState::Exhausted(last) => {
                    error!(
                        attempts = last.attempt,
                        kind = %last.kind(),
                        payload = %last.payload,
                        error = %last.failure,
                        "all retry attempts exhausted"
                    );
                    return Err(RetryError::Exhausted {
                        attempts: last.attempt,
                        last,
                    });
                }
                AttemptState::Fatal(failure) => {
                    error!(
                        attempt = failure.attempt,
                        kind = %failure.kind(),
                        payload = %failure.payload,
                        error = %failure.failure,
                        "non-retryable failure"
                    );
                    return Err(RetryError::Fatal(failure));
                }
            };
        }
    }

    fn on_failure(&self, failure: ClassifiedFailure) -> AttemptState {
        if !failure.failure.is_retryable() {
            return AttemptState::Fatal(failure);
        }
        if failure.attempt >= self.max_attempts {
            return AttemptState::Exhausted(failure);
        }

        let delay = self.backoff.delay_for_retry(failure.attempt - 1);
        warn!(
            attempt = failure.attempt,
            max_attempts = self.max_attempts,
            kind = %failure.kind(),
            payload = %failure.payload,
            delay_secs = delay.as_secs_f64(),
            error = %failure.failure,
            "retrying after failure"
        );

        AttemptState::Waiting {
            next: failure.attempt + 1,
            delay,
        }
    }
}
