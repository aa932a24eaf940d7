//! Layered configuration loading

use super::model::RelayConfig;
use crate::error::{RelayError, RelayResult};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Prefix of every environment override
pub const ENV_PREFIX: &str = "CHATRELAY_";

/// Load defaults, then `path` if given, then the process environment, and
/// validate the result.
pub fn load_config(path: Option<&Path>) -> RelayResult<RelayConfig> {
    let mut config = match path {
        Some(path) => load_from_file(path)?,
        None => RelayConfig::default(),
    };

    apply_env(&mut config, |key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

/// Parse a TOML file; missing sections keep their defaults
pub fn load_from_file(path: &Path) -> RelayResult<RelayConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        RelayError::io_with_path(
            format!("Failed to read config file: {}", e),
            path.display().to_string(),
        )
    })?;

    let config: RelayConfig = toml::from_str(&content).map_err(|e| {
        RelayError::config_with_context(
            format!("Invalid config file: {}", e.message()),
            format!("Parsing {}", path.display()),
        )
    })?;

    debug!(path = %path.display(), "loaded configuration file");
    Ok(config)
}

/// Apply `CHATRELAY_*` overrides read through `lookup`.
///
/// Taking the lookup as a function keeps this testable without touching the
/// real process environment.
pub fn apply_env<F>(config: &mut RelayConfig, lookup: F) -> RelayResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

    if let Some(host) = var("HOST") {
        config.server.host = host;
    }
    if let Some(port) = var("PORT") {
        config.server.port = parse_var("PORT", &port)?;
    }
    if let Some(required) = var("REQUIRE_SESSION") {
        config.server.require_session = parse_bool("REQUIRE_SESSION", &required)?;
    }

    if let Some(url) = var("API_URL") {
        config.upstream.api_url = url;
    }
    if let Some(model) = var("MODEL") {
        config.upstream.model = model;
    }
    if let Some(timeout) = var("REQUEST_TIMEOUT_SECS") {
        config.upstream.request_timeout_secs = parse_var("REQUEST_TIMEOUT_SECS", &timeout)?;
    }

    if let Some(length) = var("MAX_CONTEXT_LENGTH") {
        config.context.max_context_length = parse_var("MAX_CONTEXT_LENGTH", &length)?;
    }

    // Seed values only; set_proxy replaces them at runtime.
    let http_proxy = var("HTTP_PROXY");
    let https_proxy = var("HTTPS_PROXY");
    if http_proxy.is_some() || https_proxy.is_some() {
        config.proxy.use_proxy = true;
        config.proxy.http_proxy = http_proxy.or(config.proxy.http_proxy.take());
        config.proxy.https_proxy = https_proxy.or(config.proxy.https_proxy.take());
        config.proxy = std::mem::take(&mut config.proxy).normalized();
    }

    if let Some(level) = var("LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(format) = var("LOG_FORMAT") {
        config.logging.format = format.parse()?;
    }

    Ok(())
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> RelayResult<T> {
    value.trim().parse().map_err(|_| {
        RelayError::config(format!("Invalid {}{} value: '{}'", ENV_PREFIX, name, value))
    })
}

fn parse_bool(name: &str, value: &str) -> RelayResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(RelayError::config(format!(
            "Invalid {}{} value: '{}'",
            ENV_PREFIX, name, value
        ))),
    }
}
