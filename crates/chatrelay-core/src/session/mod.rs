//! Session identifiers and caller credentials
//!
//! A session id is only a lookup key for a conversation window. The
//! credential travels with each request and is never stored.

mod credential;
mod id;
mod registry;

pub use credential::{CREDENTIAL_PREFIX, Credential};
pub use id::{DEFAULT_SESSION_KEY, SESSION_ID_BYTES, SessionId};
pub use registry::SessionRegistry;
