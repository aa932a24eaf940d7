//! Command routing logic for CLI

use crate::args::{Cli, Commands, ConfigAction};
use crate::{commands, logging};
use anyhow::Context;
use chatrelay_core::{RelayConfig, load_config};

/// Route CLI commands to their respective handlers
pub async fn route(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Config { ref action } => match action {
            ConfigAction::Show => commands::config::show(cli.config.as_deref()),
            ConfigAction::Validate => commands::config::validate(cli.config.as_deref()),
        },
        Commands::Serve(ref args) => {
            let config = load(&cli)?;
            commands::serve::execute(config, args.clone()).await
        }
        Commands::Ask(ref args) => {
            let config = load(&cli)?;
            commands::ask::execute(&config, args.clone()).await
        }
    }
}

/// Load configuration, apply the global logging flags and start logging
fn load(cli: &Cli) -> anyhow::Result<RelayConfig> {
    let mut config = load_config(cli.config.as_deref()).context("failed to load configuration")?;

    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }

    logging::init(&config.logging)?;
    Ok(config)
}
