//! Completion API plumbing
//!
//! Message types, the outbound request/response shapes, and the executor
//! that performs one classified attempt against the remote API.

pub mod executor;
#[cfg(test)]
mod executor_tests;
pub mod messages;
pub mod payload;

pub use executor::{HttpExecutor, RemoteCallExecutor};
#[cfg(test)]
pub use executor::MockRemoteCallExecutor;
pub use messages::{ConversationTurn, MessageRole};
pub use payload::{ChatCompletionRequest, CompletionResponse, ModelParameters};
