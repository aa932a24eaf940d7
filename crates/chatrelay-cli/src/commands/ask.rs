//! `chatrelay ask`: one question, answered through the same pipeline the
//! server uses, with a throwaway in-process conversation.

use crate::args::AskArgs;
use crate::console::CliConsole;
use chatrelay_core::{
    ContextStore, ConversationOrchestrator, InMemoryContextStore, ProxyRegistry, RelayConfig,
    SessionId,
};
use std::sync::Arc;

pub async fn execute(config: &RelayConfig, args: AskArgs) -> anyhow::Result<()> {
    let console = CliConsole::new(true);

    let store: Arc<dyn ContextStore> = Arc::new(InMemoryContextStore::with_capacity(
        config.context.max_context_length,
    ));
    let proxy = Arc::new(ProxyRegistry::new(config.proxy.clone()));
    let orchestrator = ConversationOrchestrator::from_config(config, proxy, store)?;
    let session = SessionId::generate();

    let spinner = console.spinner(&format!("Asking {}...", config.upstream.model))?;
    let result = orchestrator
        .ask(Some(&session), &args.question, args.api_key.as_deref())
        .await;
    spinner.finish_and_clear();

    match result {
        Ok(answer) => {
            println!("{}", answer.text);
            if args.raw {
                println!("{}", serde_json::to_string_pretty(&answer.raw_response)?);
            }
            tracing::debug!(elapsed_ms = answer.elapsed.as_millis() as u64, "answer printed");
            Ok(())
        }
        Err(error) => {
            console.error(&error.title());
            if let Some(details) = error.details() {
                eprintln!("  {}", details);
            }
            anyhow::bail!("request failed with status {}", error.status_code())
        }
    }
}
