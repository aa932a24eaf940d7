//! In-process context store

use super::window::ConversationWindow;
use super::{ContextStore, MAX_CONTEXT_LENGTH};
use crate::llm::messages::ConversationTurn;
use crate::session::SessionId;
use dashmap::DashMap;

/// Process-local [`ContextStore`]; contents are lost on restart.
///
/// Each window sits behind its shard lock for the duration of one
/// append-and-trim, so the bound is never observably exceeded.
#[derive(Debug)]
pub struct InMemoryContextStore {
    windows: DashMap<SessionId, ConversationWindow>,
    capacity: usize,
}

impl InMemoryContextStore {
    pub fn new() -> Self {
        Self::with_capacity(MAX_CONTEXT_LENGTH)
    }

    /// Store whose windows hold at most `capacity` turns
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            windows: DashMap::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryContextStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextStore for InMemoryContextStore {
    fn append(&self, session: &SessionId, turn: ConversationTurn) {
        self.windows
            .entry(session.clone())
            .or_insert_with(|| ConversationWindow::new(self.capacity))
            .push(turn);
    }

    fn get(&self, session: &SessionId) -> Vec<ConversationTurn> {
        self.windows
            .get(session)
            .map(|window| window.to_vec())
            .unwrap_or_default()
    }

    fn clear(&self, session: &SessionId) {
        if self.windows.remove(session).is_some() {
            tracing::debug!(session_id = %session, "conversation window cleared");
        }
    }

    fn session_count(&self) -> usize {
        self.windows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn contents(turns: &[ConversationTurn]) -> Vec<String> {
        turns.iter().map(|t| t.content().to_string()).collect()
    }

    #[test]
    fn test_unknown_session_is_empty() {
        let store = InMemoryContextStore::new();
        assert!(store.get(&SessionId::from("nobody")).is_empty());
        assert_eq!(store.session_count(), 0);
    }

    #[test]
    fn test_window_length_is_min_of_appends_and_bound() {
        for n in [0usize, 1, 9, 10, 11, 25] {
            let store = InMemoryContextStore::new();
            let session = SessionId::generate();
            for i in 0..n {
                store.append(&session, ConversationTurn::user(format!("t{i}")));
            }

            let window = store.get(&session);
            assert_eq!(window.len(), n.min(MAX_CONTEXT_LENGTH));

            let expected: Vec<String> = (n.saturating_sub(MAX_CONTEXT_LENGTH)..n)
                .map(|i| format!("t{i}"))
                .collect();
            assert_eq!(contents(&window), expected);
        }
    }

    #[test]
    fn test_sessions_are_isolated() {
        let store = InMemoryContextStore::new();
        let a = SessionId::from("a");
        let b = SessionId::from("b");

        store.append(&a, ConversationTurn::user("for a"));
        store.append(&b, ConversationTurn::user("for b"));

        assert_eq!(contents(&store.get(&a)), vec!["for a"]);
        assert_eq!(contents(&store.get(&b)), vec!["for b"]);
        assert_eq!(store.session_count(), 2);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = InMemoryContextStore::new();
        let session = SessionId::from("bye");
        store.append(&session, ConversationTurn::user("hello"));

        store.clear(&session);
        store.clear(&session);

        assert!(store.get(&session).is_empty());
        assert_eq!(store.session_count(), 0);
    }

    #[test]
    fn test_concurrent_appends_never_exceed_bound() {
        let store = Arc::new(InMemoryContextStore::new());
        let session = SessionId::from("shared");

        let writers: Vec<_> = (0..8)
            .map(|w| {
                let store = store.clone();
                let session = session.clone();
                std::thread::spawn(move || {
                    for i in 0..200 {
                        store.append(&session, ConversationTurn::user(format!("{w}-{i}")));
                        assert!(store.get(&session).len() <= MAX_CONTEXT_LENGTH);
                    }
                })
            })
            .collect();

        for writer in writers {
            writer.join().unwrap();
        }
        assert_eq!(store.get(&session).len(), MAX_CONTEXT_LENGTH);
    }
}
