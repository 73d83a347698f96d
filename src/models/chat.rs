//! Chat widget data models
//!
//! Defines the JSON contract between the embedded chat widget and the relay

use serde::{Deserialize, Serialize};

/// Inbound chat request payload
///
/// Fields arrive loosely typed so that shape problems surface as our own
/// validation errors instead of a generic deserialization failure. The
/// conversation history in particular is kept as a raw JSON value until
/// its list shape has been checked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPayload {
    /// User message text
    #[serde(default)]
    pub message: Option<String>,
    /// Client-generated opaque session identifier
    #[serde(default)]
    pub session_id: Option<String>,
    /// Locale code for the reply language (defaults to "en")
    #[serde(default)]
    pub language: Option<String>,
    /// Prior turns in chronological order, supplied by the client
    #[serde(default)]
    pub conversation_history: Option<serde_json::Value>,
}

/// A single prior turn of the conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryTurn {
    /// Who produced the turn
    pub role: TurnRole,
    /// Turn text
    pub content: String,
}

/// Role of a conversation turn
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    /// Wire name of the role, as the upstream API expects it
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
        }
    }
}

/// A chat request that passed validation
#[derive(Debug, Clone)]
pub struct ValidatedChat {
    pub message: String,
    pub session_id: String,
    pub language: String,
    pub history: Vec<HistoryTurn>,
}

/// Outbound chat response
///
/// `messages` is the ordered list of display bubbles split out of the
/// upstream reply. Segments starting with `FOLLOWUP:` carry suggested
/// follow-up questions; the widget routes those to its quick-reply UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub messages: Vec<String>,
}
