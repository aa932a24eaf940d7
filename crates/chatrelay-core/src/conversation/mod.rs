//! One question/answer exchange per call
//!
//! The orchestrator validates input before touching any state, records the
//! user turn, sends the whole window through the retry loop and records the
//! assistant turn only when an answer came back.

mod orchestrator;

pub use orchestrator::{Answer, ConversationOrchestrator, SessionPolicy};
