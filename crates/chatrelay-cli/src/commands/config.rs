//! Configuration management commands

use crate::console::CliConsole;
use chatrelay_core::config::{ENV_PREFIX, RelayConfig, apply_env, load_from_file};
use std::path::Path;

/// Defaults, then the file if given, then the environment; not validated
fn effective(path: Option<&Path>) -> anyhow::Result<RelayConfig> {
    let mut config = match path {
        Some(path) => load_from_file(path)?,
        None => RelayConfig::default(),
    };
    apply_env(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

/// Show current configuration
pub fn show(path: Option<&Path>) -> anyhow::Result<()> {
    let console = CliConsole::new(true);
    console.print_header("Configuration");

    match path {
        Some(path) => console.info(&format!("Loaded from: {}", path.display())),
        None => console.info("Using defaults"),
    }
    console.info(&format!("{}* environment variables applied", ENV_PREFIX));

    let config = effective(path)?;
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

/// Validate configuration
pub fn validate(path: Option<&Path>) -> anyhow::Result<()> {
    let console = CliConsole::new(true);
    console.print_header("Configuration Validation");

    let config = effective(path)?;
    if let Err(e) = config.validate() {
        console.error(&format!("Configuration validation failed: {}", e));
        return Err(e.into());
    }

    console.success("Configuration is valid");
    console.info(&format!("Listen address: {}", config.listen_address()));
    console.info(&format!("Upstream: {} ({})", config.upstream.api_url, config.upstream.model));
    console.info(&format!(
        "Retry: {} attempts, {}s..{}s backoff",
        config.retry.max_attempts, config.retry.min_delay_secs, config.retry.max_delay_secs
    ));
    console.info(&format!(
        "Proxy: {}",
        if config.proxy.is_active() { "enabled" } else { "direct" }
    ));
    Ok(())
}
