//! Session ids handed out by this process

use super::SessionId;
use dashmap::DashSet;

/// Ids issued by a successful key check and not yet revoked.
///
/// Only ids found here address a conversation window; anything else a
/// client sends is treated as no session at all.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    issued: DashSet<SessionId>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate and record a fresh id
    pub fn issue(&self) -> SessionId {
        let session = SessionId::generate();
        self.issued.insert(session.clone());
        session
    }

    pub fn contains(&self, session: &SessionId) -> bool {
        self.issued.contains(session)
    }

    /// Forget `session`. Returns whether it was issued and still live.
    pub fn revoke(&self, session: &SessionId) -> bool {
        self.issued.remove(session).is_some()
    }

    pub fn len(&self) -> usize {
        self.issued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }
}
