//! Centralized timeout and retry defaults

use std::time::Duration;

/// Defaults for calls to the completion API
pub mod upstream {
    use super::*;

    /// Upper bound on one whole call, connect to last byte (120 seconds)
    pub const REQUEST_SECS: u64 = 120;

    /// Get request timeout as Duration
    pub fn request_timeout() -> Duration {
        Duration::from_secs(REQUEST_SECS)
    }
}

/// Defaults for the retry loop
pub mod retry {
    /// Attempts per question, the first one included
    pub const MAX_ATTEMPTS: u32 = 3;

    /// Floor of the backoff between attempts
    pub const MIN_DELAY_SECS: f64 = 4.0;

    /// Ceiling of the backoff between attempts
    pub const MAX_DELAY_SECS: f64 = 10.0;

    /// Growth factor between successive waits
    pub const BACKOFF_FACTOR: f64 = 2.0;

    /// Largest wait a configuration may ask for
    pub const DELAY_LIMIT_SECS: f64 = 3600.0;
}
