//! Outbound request body and parsed response

use super::messages::ConversationTurn;
use crate::error::{PayloadSummary, TransportFailure};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Completion endpoint used when nothing else is configured
pub const DEFAULT_API_URL: &str = "https://api.deepseek.com/chat/completions";
/// Model identifier sent with every request
pub const DEFAULT_MODEL: &str = "deepseek-chat";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 4000;

/// Fixed sampling parameters of the outbound payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParameters {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Body of `POST /chat/completions`. Always non-streaming.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ConversationTurn>,
    pub temperature: f64,
    pub max_tokens: u32,
    pub stream: bool,
}

impl ChatCompletionRequest {
    pub fn new(params: &ModelParameters, messages: Vec<ConversationTurn>) -> Self {
        Self {
            model: params.model.clone(),
            messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            stream: false,
        }
    }

    /// Counts-only description for failure diagnostics
    pub fn summary(&self) -> PayloadSummary {
        PayloadSummary {
            model: self.model.clone(),
            message_count: self.messages.len(),
            last_message_chars: self
                .messages
                .last()
                .map(|turn| turn.content().chars().count())
                .unwrap_or(0),
        }
    }
}

/// A successful completion
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    /// `choices[0].message.content`
    pub answer: String,
    /// The full decoded body, relayed to callers untouched
    pub raw: Value,
    /// Wall time of the attempt that produced this response
    pub elapsed: Duration,
}

impl CompletionResponse {
    /// Extract the answer from a decoded 2xx body
    pub fn from_json(raw: Value, elapsed: Duration) -> Result<Self, TransportFailure> {
        let answer = raw
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(Value::as_str)
            .ok_or_else(|| TransportFailure::MalformedResponse {
                message: "response has no choices[0].message.content".to_string(),
            })?
            .to_string();

        Ok(Self {
            answer,
            raw,
            elapsed,
        })
    }
}
