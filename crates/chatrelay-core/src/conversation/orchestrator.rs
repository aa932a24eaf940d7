//! Conversation orchestrator

use crate::config::{ProxyRegistry, RelayConfig};
use crate::context::ContextStore;
use crate::error::{RelayResult, UserFacingError, ValidationReason};
use crate::llm::executor::{HttpExecutor, RemoteCallExecutor};
use crate::llm::messages::ConversationTurn;
use crate::llm::payload::{ChatCompletionRequest, ModelParameters};
use crate::recovery::{RetryConfig, RetryController};
use crate::session::{Credential, SessionId};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, instrument, warn};

/// What to do with a request that carries no session id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPolicy {
    /// Reject it as unauthenticated
    #[default]
    Required,
    /// Use the shared `default` window
    DefaultKey,
}

impl SessionPolicy {
    pub fn from_required(required: bool) -> Self {
        if required {
            Self::Required
        } else {
            Self::DefaultKey
        }
    }
}

/// A successful exchange
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    /// Assistant text, also recorded in the window
    pub text: String,
    /// Completion API body, passed through unmodified
    pub raw_response: Value,
    /// Wall time of the whole call, backoff waits included
    pub elapsed: Duration,
}

/// Per-session exchange state, kept in the map only while an exchange is
/// queued or running.
#[derive(Default)]
struct ExchangeSlot {
    turn: tokio::sync::Mutex<()>,
    /// Bumped by `end_session`; an answer whose exchange started under an
    /// older generation is not recorded.
    generation: Mutex<u64>,
}

/// Drives one exchange: validate, record, call, record.
///
/// Exchanges on the same session are serialized by a per-session lock held
/// across the remote call, so every user turn is directly followed by its
/// own answer. Ending a session while an exchange is in flight discards
/// that exchange's late answer instead of recording it in the fresh window.
/// The store itself is only locked for single appends and
/// reads, and different sessions never wait on each other.
pub struct ConversationOrchestrator {
    store: Arc<dyn ContextStore>,
    retry: RetryController,
    proxy: Arc<ProxyRegistry>,
    params: ModelParameters,
    policy: SessionPolicy,
    exchange_slots: DashMap<SessionId, Arc<ExchangeSlot>>,
}

impl ConversationOrchestrator {
    pub fn new(
        store: Arc<dyn ContextStore>,
        retry: RetryController,
        proxy: Arc<ProxyRegistry>,
        params: ModelParameters,
        policy: SessionPolicy,
    ) -> Self {
        Self {
            store,
            retry,
            proxy,
            params,
            policy,
            exchange_slots: DashMap::new(),
        }
    }

    /// Wire the HTTP executor and retry loop described by `config`
    pub fn from_config(
        config: &RelayConfig,
        proxy: Arc<ProxyRegistry>,
        store: Arc<dyn ContextStore>,
    ) -> RelayResult<Self> {
        config.validate()?;
        let executor = HttpExecutor::new(
            config.upstream.api_url.clone(),
            config.upstream.request_timeout(),
        )?;
        Ok(Self::with_executor(
            config,
            proxy,
            store,
            Arc::new(executor),
            config.retry.to_retry_config(),
        ))
    }

    /// Like [`from_config`](Self::from_config) with a caller-supplied executor
    pub fn with_executor(
        config: &RelayConfig,
        proxy: Arc<ProxyRegistry>,
        store: Arc<dyn ContextStore>,
        executor: Arc<dyn RemoteCallExecutor>,
        retry: RetryConfig,
    ) -> Self {
        Self::new(
            store,
            RetryController::new(executor, retry),
            proxy,
            config.upstream.model_parameters(),
            SessionPolicy::from_required(config.server.require_session),
        )
    }

    pub fn proxy_registry(&self) -> &Arc<ProxyRegistry> {
        &self.proxy
    }

    /// Ask `question` within `session`.
    ///
    /// Validation order is question, credential, session. A rejected
    /// request leaves the store untouched. Once validated, the user turn
    /// stays in the window even if no answer arrives.
    #[instrument(skip_all, fields(session_id = tracing::field::Empty))]
    pub async fn ask(
        &self,
        session: Option<&SessionId>,
        question: &str,
        api_key: Option<&str>,
    ) -> Result<Answer, UserFacingError> {
        if question.trim().is_empty() {
            return Err(UserFacingError::validation(ValidationReason::EmptyQuestion));
        }
        let credential = api_key
            .and_then(Credential::new)
            .ok_or(UserFacingError::validation(ValidationReason::MissingCredential))?;
        let session = self.resolve_session(session)?;
        tracing::Span::current().record("session_id", tracing::field::display(&session));

        let slot = self.exchange_slot(&session);
        let result = self.exchange(&slot, &session, question, &credential).await;
        self.release_slot(&session, &slot);
        result
    }

    async fn exchange(
        &self,
        slot: &ExchangeSlot,
        session: &SessionId,
        question: &str,
        credential: &Credential,
    ) -> Result<Answer, UserFacingError> {
        let _turn = slot.turn.lock().await;

        let generation = {
            let generation = slot.generation.lock();
            self.store.append(session, ConversationTurn::user(question));
            *generation
        };
        let payload = ChatCompletionRequest::new(&self.params, self.store.get(session));
        let proxy = self.proxy.snapshot();

        info!(
            credential = %credential,
            messages = payload.messages.len(),
            use_proxy = proxy.is_active(),
            "sending question to completion API"
        );

        let started = Instant::now();
        match self.retry.call(&payload, credential, &proxy).await {
            Ok(response) => {
                let elapsed = started.elapsed();
                info!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    last_attempt_ms = response.elapsed.as_millis() as u64,
                    answer_chars = response.answer.chars().count(),
                    "completion received"
                );
                let recorded = {
                    let current = slot.generation.lock();
                    if *current == generation {
                        self.store
                            .append(session, ConversationTurn::assistant(response.answer.clone()));
                        true
                    } else {
                        false
                    }
                };
                if !recorded {
                    warn!("session ended during the call, answer not recorded");
                }
                Ok(Answer {
                    text: response.answer,
                    raw_response: response.raw,
                    elapsed,
                })
            }
            Err(error) => {
                let error = UserFacingError::from(error);
                warn!(
                    status = error.status_code(),
                    category = error.category().display_name(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %error,
                    "exchange failed, no answer recorded"
                );
                Err(error)
            }
        }
    }

    /// Drop the session's window. Safe to call for unknown or already
    /// ended sessions. An exchange still waiting on the completion API
    /// keeps running but its answer is discarded.
    pub fn end_session(&self, session: &SessionId) {
        let slot = self.exchange_slots.get(session).map(|slot| Arc::clone(&slot));
        match slot {
            Some(slot) => {
                let mut generation = slot.generation.lock();
                *generation += 1;
                self.store.clear(session);
            }
            None => self.store.clear(session),
        }
        info!(session_id = %session, "session ended");
    }

    /// Window contents, oldest turn first
    pub fn history(&self, session: &SessionId) -> Vec<ConversationTurn> {
        self.store.get(session)
    }

    pub fn session_count(&self) -> usize {
        self.store.session_count()
    }

    fn resolve_session(&self, session: Option<&SessionId>) -> Result<SessionId, UserFacingError> {
        match (session, self.policy) {
            (Some(id), _) => Ok(id.clone()),
            (None, SessionPolicy::DefaultKey) => Ok(SessionId::default_session()),
            (None, SessionPolicy::Required) => {
                Err(UserFacingError::validation(ValidationReason::MissingSession))
            }
        }
    }

    fn exchange_slot(&self, session: &SessionId) -> Arc<ExchangeSlot> {
        self.exchange_slots
            .entry(session.clone())
            .or_default()
            .clone()
    }

    /// Drop the map entry once no other exchange holds or waits on it
    fn release_slot(&self, session: &SessionId, slot: &Arc<ExchangeSlot>) {
        self.exchange_slots.remove_if(session, |_, held| {
            Arc::ptr_eq(held, slot) && Arc::strong_count(held) == 2
        });
    }

    #[cfg(test)]
    pub(super) fn tracked_exchanges(&self) -> usize {
        self.exchange_slots.len()
    }
}
