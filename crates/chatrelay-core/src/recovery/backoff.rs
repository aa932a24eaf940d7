//! Backoff strategy for retry operations

use rand::Rng;
use std::time::Duration;

/// Configuration for backoff behavior
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffConfig {
    /// Delay before the first retry; also the floor of every delay
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub multiplier: f64,
    /// Add random jitter to prevent thundering herd
    pub jitter: bool,
    /// Maximum jitter ratio (0.0 - 1.0)
    pub jitter_ratio: f64,
}

impl Default for BackoffConfig {
    /// 4s, 8s, then capped at 10s
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(4),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
            jitter: false,
            jitter_ratio: 0.0,
        }
    }
}

impl BackoffConfig {
    /// Create a new backoff config with custom initial delay
    pub fn with_initial_delay(initial_delay: Duration) -> Self {
        Self {
            initial_delay,
            ..Default::default()
        }
    }

    /// Set the maximum delay
    pub fn max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Set the multiplier
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Enable jitter of up to `ratio` of each delay
    pub fn jitter(mut self, ratio: f64) -> Self {
        self.jitter = ratio > 0.0;
        self.jitter_ratio = ratio.clamp(0.0, 1.0);
        self
    }
}

/// Exponential backoff clamped to `[initial_delay, max_delay]`
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    config: BackoffConfig,
}

impl ExponentialBackoff {
    pub fn new() -> Self {
        Self::with_config(BackoffConfig::default())
    }

    pub fn with_config(config: BackoffConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BackoffConfig {
        &self.config
    }

    /// Delay before retry number `retry` (0-indexed: 0 is the wait after the
    /// first failed attempt)
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let floor = self.config.initial_delay.as_secs_f64();
        let ceiling = self.config.max_delay.as_secs_f64().max(floor);

        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        let base = floor * self.config.multiplier.powi(exponent);
        let base = if base.is_finite() { base } else { ceiling };
        let delay = self.add_jitter(base.clamp(floor, ceiling));

        Duration::from_secs_f64(delay.min(ceiling))
    }

    fn add_jitter(&self, delay: f64) -> f64 {
        if !self.config.jitter || delay <= 0.0 {
            return delay;
        }
        let range = delay * self.config.jitter_ratio;
        delay + rand::thread_rng().gen_range(0.0..=range)
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule() {
        let backoff = ExponentialBackoff::new();

        assert_eq!(backoff.delay_for_retry(0), Duration::from_secs(4));
        assert_eq!(backoff.delay_for_retry(1), Duration::from_secs(8));
        assert_eq!(backoff.delay_for_retry(2), Duration::from_secs(10));
        assert_eq!(backoff.delay_for_retry(30), Duration::from_secs(10));
    }

    #[test]
    fn test_multiplier_below_one_is_floored() {
        let backoff = ExponentialBackoff::with_config(BackoffConfig::default().multiplier(0.5));
        assert_eq!(backoff.delay_for_retry(3), Duration::from_secs(4));
    }

    #[test]
    fn test_jitter_never_exceeds_ceiling() {
        let backoff = ExponentialBackoff::with_config(
            BackoffConfig::with_initial_delay(Duration::from_secs(1))
                .max_delay(Duration::from_secs(2))
                .jitter(1.0),
        );

        for retry in 0..20 {
            let delay = backoff.delay_for_retry(retry);
            assert!(delay >= Duration::from_secs(1));
            assert!(delay <= Duration::from_secs(2));
        }
    }

    #[test]
    fn test_zero_delays() {
        let backoff = ExponentialBackoff::with_config(
            BackoffConfig::with_initial_delay(Duration::ZERO).max_delay(Duration::ZERO),
        );
        assert_eq!(backoff.delay_for_retry(5), Duration::ZERO);
    }
}
