//! CLI argument definitions using clap

use chatrelay_core::config::LogFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "chatrelay")]
#[command(about = "Stateful relay between chat clients and the DeepSeek completion API")]
#[command(version)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, short = 'c', global = true, env = "CHATRELAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level filter; RUST_LOG takes precedence when set
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log output format: pretty, compact or json
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    Serve(ServeArgs),

    /// Ask a single question and print the answer
    Ask(AskArgs),

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, short)]
    pub port: Option<u16>,

    /// Let requests without a session share one default conversation
    #[arg(long)]
    pub no_session: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AskArgs {
    /// The question to ask
    pub question: String,

    /// API key for the completion API
    #[arg(long, env = "DEEPSEEK_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Also print the raw completion response
    #[arg(long)]
    pub raw: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Check the configuration for errors
    Validate,
}
