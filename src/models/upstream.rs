//! Upstream completion API data models
//!
//! Request and response structures for the OpenAI-compatible
//! chat-completion endpoint the relay forwards to

use serde::{Deserialize, Serialize};

/// Chat completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model name
    pub model: String,
    /// Message list: system prompt, history, then the new user message
    pub messages: Vec<CompletionMessage>,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_tokens: u32,
}

/// A single message in the completion request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletionMessage {
    /// Role (system/user/assistant)
    pub role: String,
    /// Message content
    pub content: String,
}

impl CompletionMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Chat completion response
///
/// Only the fields the relay consumes are modeled; everything else in the
/// provider's response is ignored on deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Generated choices
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

/// A single completion choice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionChoice {
    /// The generated message
    pub message: CompletionChoiceMessage,
}

/// Message content of a completion choice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionChoiceMessage {
    /// Reply text; absent for refusal/tool-only responses
    #[serde(default)]
    pub content: Option<String>,
}

impl CompletionResponse {
    /// Extract the reply text of the first choice, if any
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
    }
}

/// Provider error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionErrorResponse {
    pub error: CompletionError,
}

/// Provider error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionError {
    /// Human-readable error message
    pub message: String,
    /// Provider error category (optional)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}
