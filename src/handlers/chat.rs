//! Chat relay handler
//!
//! Turns a widget request into a multi-bubble assistant reply: rate
//! check, validation, prompt assembly, upstream call, reply splitting.
//! Every failure is converted to a structured error response; nothing
//! propagates as an unhandled fault.

use crate::handlers::AppState;
use crate::models::chat::{ChatPayload, ChatResponse, HistoryTurn, ValidatedChat};
use crate::services::{prompt, reply, CompletionProvider, RateLimiter};
use crate::utils::error::{AppError, AppResult};
use crate::utils::logging::truncate_content;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Maximum user message length in characters
pub const MAX_MESSAGE_CHARS: usize = 500;

/// Handle widget chat requests
///
/// POST /api/chat
pub async fn handle_chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<ChatPayload>, JsonRejection>,
) -> AppResult<Response> {
    // The rate check precedes parsing, so rejected calls stay cheap and
    // even malformed requests count against the quota
    let client_id = client_identifier(&headers);
    let decision = state.limiter.check(&client_id).await;

    if !decision.allowed {
        let now_ms = chrono::Utc::now().timestamp_millis() as u64;
        warn!("Client {} exceeded rate limit", client_id);
        return Err(AppError::RateLimited {
            retry_after_secs: decision.retry_after_secs(now_ms),
            limit: decision.limit,
            reset_ms: decision.reset_ms,
        });
    }

    let Json(payload) = payload
        .map_err(|rejection| AppError::Validation(format!("Invalid JSON payload: {}", rejection)))?;

    let chat = validate_payload(payload)?;

    info!(
        "[{}] [{}] User: {}",
        chat.session_id,
        chat.language,
        truncate_content(&chat.message, 200)
    );

    let messages = prompt::build_messages(&chat.message, &chat.history, &chat.language);

    let reply_text = match state.provider.complete(messages).await {
        Ok(text) => text,
        Err(e) => {
            // Detail stays in the logs; the widget sees a generic failure
            error!("[{}] Completion call failed: {:#}", chat.session_id, e);
            return Err(AppError::Upstream(e.to_string()));
        }
    };

    let segments = reply::split_reply(&reply_text);
    let followups = reply::followup_count(&segments);

    info!(
        "[{}] Bot: {} segments, {} follow-up suggestions",
        chat.session_id,
        segments.len(),
        followups
    );
    debug!(
        "[{}] Bot reply: {}",
        chat.session_id,
        truncate_content(&reply_text, 500)
    );

    let response = (
        [
            ("x-ratelimit-limit", decision.limit.to_string()),
            ("x-ratelimit-remaining", decision.remaining.to_string()),
            ("x-ratelimit-reset", decision.reset_ms.to_string()),
        ],
        Json(ChatResponse { messages: segments }),
    )
        .into_response();

    Ok(response)
}

/// Validate the inbound payload
///
/// Checks run in a fixed order; the first failure stops processing with
/// a 400 and its message goes to the client verbatim.
fn validate_payload(payload: ChatPayload) -> AppResult<ValidatedChat> {
    let message = match payload.message {
        Some(message) if !message.trim().is_empty() => message,
        _ => {
            return Err(AppError::Validation(
                "Message is required and must be a string".to_string(),
            ))
        }
    };

    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(AppError::Validation(
            "Message too long (max 500 characters)".to_string(),
        ));
    }

    let session_id = match payload.session_id {
        Some(session_id) if !session_id.is_empty() => session_id,
        _ => {
            return Err(AppError::Validation(
                "Valid session ID is required".to_string(),
            ))
        }
    };

    let history = match payload.conversation_history {
        None => Vec::new(),
        Some(value) => {
            if !value.is_array() {
                return Err(AppError::Validation(
                    "Conversation history must be an array".to_string(),
                ));
            }
            serde_json::from_value::<Vec<HistoryTurn>>(value).map_err(|_| {
                AppError::Validation("Conversation history contains an invalid turn".to_string())
            })?
        }
    };

    let language = payload.language.unwrap_or_else(|| "en".to_string());

    Ok(ValidatedChat {
        message,
        session_id,
        language,
        history,
    })
}

/// Derive the rate-limit identifier for a request
///
/// First entry of `x-forwarded-for`, then `x-real-ip`, then a shared
/// sentinel for clients with neither.
pub fn client_identifier(headers: &HeaderMap) -> String {
    if let Some(forwarded_for) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded_for.split(',').next() {
            let ip = first.trim();
            if !ip.is_empty() {
                return ip.to_string();
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        let ip = real_ip.trim();
        if !ip.is_empty() {
            return ip.to_string();
        }
    }

    "unknown".to_string()
}
