//! Configuration data model

use super::proxy::ProxySettings;
use super::timeouts;
use crate::context::MAX_CONTEXT_LENGTH;
use crate::error::{RelayError, RelayResult};
use crate::llm::payload::{
    DEFAULT_API_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE, ModelParameters,
};
use crate::recovery::{BackoffConfig, RetryConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub context: ContextConfig,
    pub retry: RetrySettings,
    pub proxy: ProxySettings,
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// When false, callers without a session share the `default` window
    pub require_session: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            require_session: true,
        }
    }
}

/// Completion API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub api_url: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            request_timeout_secs: timeouts::upstream::REQUEST_SECS,
        }
    }
}

impl UpstreamConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn model_parameters(&self) -> ModelParameters {
        ModelParameters {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

/// Conversation window settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    pub max_context_length: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_context_length: MAX_CONTEXT_LENGTH,
        }
    }
}

/// Retry loop settings, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub min_delay_secs: f64,
    pub max_delay_secs: f64,
    pub backoff_factor: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: timeouts::retry::MAX_ATTEMPTS,
            min_delay_secs: timeouts::retry::MIN_DELAY_SECS,
            max_delay_secs: timeouts::retry::MAX_DELAY_SECS,
            backoff_factor: timeouts::retry::BACKOFF_FACTOR,
        }
    }
}

impl RetrySettings {
    pub fn to_retry_config(&self) -> RetryConfig {
        RetryConfig::new()
            .with_max_attempts(self.max_attempts)
            .with_backoff(
                BackoffConfig::with_initial_delay(bounded_delay(self.min_delay_secs))
                    .max_delay(bounded_delay(self.max_delay_secs))
                    .multiplier(self.backoff_factor),
            )
    }
}

/// Seconds to a wait within `[0, DELAY_LIMIT_SECS]`; NaN becomes zero
fn bounded_delay(secs: f64) -> Duration {
    Duration::from_secs_f64(secs.max(0.0).min(timeouts::retry::DELAY_LIMIT_SECS))
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(RelayError::invalid_field(
                "logging.format",
                format!("unknown log format '{}' (expected pretty, compact or json)", other),
            )),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` wins when set
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl RelayConfig {
    /// Check cross-field constraints
    pub fn validate(&self) -> RelayResult<()> {
        if self.server.port == 0 {
            return Err(RelayError::invalid_field("server.port", "port must not be 0"));
        }

        let url = self.upstream.api_url.as_str();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(RelayError::invalid_field(
                "upstream.api_url",
                format!("'{}' is not an http(s) URL", url),
            ));
        }
        if self.upstream.model.trim().is_empty() {
            return Err(RelayError::invalid_field("upstream.model", "model must not be empty"));
        }
        if self.upstream.request_timeout_secs == 0 {
            return Err(RelayError::invalid_field(
                "upstream.request_timeout_secs",
                "timeout must be at least one second",
            ));
        }

        if self.context.max_context_length == 0 {
            return Err(RelayError::invalid_field(
                "context.max_context_length",
                "context length must be at least 1",
            ));
        }

        let retry = &self.retry;
        if retry.max_attempts == 0 {
            return Err(RelayError::invalid_field(
                "retry.max_attempts",
                "at least one attempt is required",
            ));
        }
        let limit = timeouts::retry::DELAY_LIMIT_SECS;
        for (field, secs) in [
            ("retry.min_delay_secs", retry.min_delay_secs),
            ("retry.max_delay_secs", retry.max_delay_secs),
        ] {
            if !(0.0..=limit).contains(&secs) {
                return Err(RelayError::invalid_field(
                    field,
                    format!("{} is not a wait between 0 and {} seconds", secs, limit),
                ));
            }
        }
        if !retry.backoff_factor.is_finite() {
            return Err(RelayError::invalid_field(
                "retry.backoff_factor",
                "backoff factor must be a finite number",
            ));
        }
        if retry.min_delay_secs > retry.max_delay_secs {
            return Err(RelayError::invalid_field(
                "retry",
                format!(
                    "min_delay_secs ({}) exceeds max_delay_secs ({})",
                    retry.min_delay_secs, retry.max_delay_secs
                ),
            ));
        }

        self.proxy.validate()
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_completion_contract() {
        let config = RelayConfig::default();
        assert_eq!(config.upstream.api_url, DEFAULT_API_URL);
        assert_eq!(config.upstream.model, "deepseek-chat");
        assert_eq!(config.upstream.request_timeout(), Duration::from_secs(120));
        assert_eq!(config.context.max_context_length, 10);
        assert_eq!(config.retry.max_attempts, 3);
        assert!(!config.proxy.use_proxy);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_retry_settings_produce_default_schedule() {
        let retry = RetrySettings::default().to_retry_config();
        assert_eq!(retry, RetryConfig::default());
    }

    #[test]
    fn test_validate_rejects_inverted_delays() {
        let mut config = RelayConfig::default();
        config.retry.min_delay_secs = 20.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("min_delay_secs"));
    }

    #[test]
    fn test_validate_rejects_unbounded_delays() {
        for secs in [1e30, f64::INFINITY, f64::NAN, -1.0] {
            let mut config = RelayConfig::default();
            config.retry.max_delay_secs = secs;
            let err = config.validate().unwrap_err();
            assert!(
                matches!(&err, RelayError::InvalidInput { field: Some(field), .. } if field == "retry.max_delay_secs"),
                "{:?}",
                err
            );
        }

        let mut config = RelayConfig::default();
        config.retry.backoff_factor = f64::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_retry_settings_clamp_out_of_range_delays() {
        let settings = RetrySettings {
            min_delay_secs: f64::NAN,
            max_delay_secs: 1e30,
            ..RetrySettings::default()
        };
        let retry = settings.to_retry_config();
        assert_eq!(retry.backoff.initial_delay, Duration::ZERO);
        assert_eq!(
            retry.backoff.max_delay,
            Duration::from_secs_f64(timeouts::retry::DELAY_LIMIT_SECS)
        );
    }

    #[test]
    fn test_validate_rejects_bad_url_and_zero_values() {
        let mut config = RelayConfig::default();
        config.upstream.api_url = "ftp://example.com".into();
        assert!(config.validate().is_err());

        let mut config = RelayConfig::default();
        config.context.max_context_length = 0;
        assert!(config.validate().is_err());

        let mut config = RelayConfig::default();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
