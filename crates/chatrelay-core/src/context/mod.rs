//! Per-session conversation windows
//!
//! The store maps a [`SessionId`] to a bounded, chronologically ordered
//! window of turns. Appending and trimming happen under one lock, so a
//! reader never sees a window longer than its capacity.

mod store;
mod window;

pub use store::InMemoryContextStore;
pub use window::ConversationWindow;

use crate::llm::messages::ConversationTurn;
use crate::session::SessionId;

/// Turns kept per session
pub const MAX_CONTEXT_LENGTH: usize = 10;

/// Storage for conversation windows.
///
/// Unknown session ids are valid everywhere and denote an empty window.
pub trait ContextStore: Send + Sync {
    /// Append `turn`, dropping the oldest turns beyond the capacity
    fn append(&self, session: &SessionId, turn: ConversationTurn);

    /// Copy of the window, oldest turn first
    fn get(&self, session: &SessionId) -> Vec<ConversationTurn>;

    /// Remove the window entirely; a no-op for unknown ids
    fn clear(&self, session: &SessionId);

    /// Number of sessions holding a window
    fn session_count(&self) -> usize;
}
