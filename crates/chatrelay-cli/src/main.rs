//! Chatrelay CLI application
//!
//! Runs the relay server, asks one-shot questions from the terminal and
//! inspects configuration.
//!
//! ```bash
//! chatrelay serve --port 5000
//! chatrelay ask "What is the capital of France?"
//! chatrelay config show
//! ```

mod args;
mod commands;
mod console;
mod logging;
mod router;

use args::Cli;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    router::route(cli).await
}
