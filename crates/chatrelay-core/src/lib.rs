//! Chatrelay Core Library
//!
//! This crate provides the conversation pipeline behind the chatrelay server:
//! per-session context windows, the completion call executor with proxy
//! fallback, the bounded retry loop and the mapping from transport failures
//! to user-facing errors.

pub mod config;
pub mod context;
pub mod conversation;
pub mod error;
pub mod llm;
pub mod recovery;
pub mod session;

// Re-export commonly used types
pub use config::{ProxyRegistry, ProxySettings, RelayConfig, load_config};
pub use context::{ContextStore, InMemoryContextStore, MAX_CONTEXT_LENGTH};
pub use conversation::{Answer, ConversationOrchestrator, SessionPolicy};
pub use error::{RelayError, RelayResult, TransportFailure, UserFacingError};
pub use llm::{ConversationTurn, HttpExecutor, MessageRole, RemoteCallExecutor};
pub use recovery::{RetryConfig, RetryController};
pub use session::{Credential, SessionId, SessionRegistry};
