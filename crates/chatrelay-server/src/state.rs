//! Application state for the relay server.

use chatrelay_core::{
    ContextStore, ConversationOrchestrator, InMemoryContextStore, ProxyRegistry, RelayConfig,
    RelayResult, SessionRegistry,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Shared state handed to every handler.
pub struct AppState {
    pub orchestrator: ConversationOrchestrator,
    /// Ids handed out by `/verify_key`
    pub sessions: SessionRegistry,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(orchestrator: ConversationOrchestrator) -> Self {
        Self {
            orchestrator,
            sessions: SessionRegistry::new(),
            started_at: Utc::now(),
        }
    }

    /// Wire an in-memory store, the proxy registry and the HTTP executor
    /// from `config`.
    pub fn from_config(config: &RelayConfig) -> RelayResult<Self> {
        let store: Arc<dyn ContextStore> = Arc::new(InMemoryContextStore::with_capacity(
            config.context.max_context_length,
        ));
        let proxy = Arc::new(ProxyRegistry::new(config.proxy.clone()));
        let orchestrator = ConversationOrchestrator::from_config(config, proxy, store)?;
        Ok(Self::new(orchestrator))
    }

    pub fn proxy(&self) -> &ProxyRegistry {
        self.orchestrator.proxy_registry()
    }
}
