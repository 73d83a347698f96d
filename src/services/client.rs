//! Upstream completion client
//!
//! Encapsulates HTTP communication with the chat-completion provider

use crate::config::Settings;
use crate::models::upstream::*;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::{debug, error, warn};

/// Fallback reply when the provider returns no usable content
pub const EMPTY_REPLY_FALLBACK: &str =
    "I apologize, but I could not process your request. Please try again.";

/// Completion provider port
///
/// The relay handler depends on this trait; tests inject stubs with
/// call counters and canned replies.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send the assembled message list and return the reply text
    async fn complete(&self, messages: Vec<CompletionMessage>) -> Result<String>;
}

/// HTTP client for the OpenAI-compatible completion endpoint
#[derive(Debug, Clone)]
pub struct CompletionClient {
    client: Client,
    settings: Settings,
}

impl CompletionClient {
    /// Create a new client instance
    ///
    /// The configured timeout bounds the whole upstream call; dropping
    /// the request future aborts an in-flight call.
    pub fn new(settings: Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.upstream.timeout))
            .user_agent(concat!("chatrelay/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, settings })
    }

    /// Handle HTTP response
    async fn handle_response(&self, response: Response) -> Result<CompletionResponse> {
        let status = response.status();

        if status.is_success() {
            let completion: CompletionResponse = response
                .json()
                .await
                .context("Failed to parse completion response")?;

            debug!("Completion request finished successfully");
            Ok(completion)
        } else {
            let error_text = response.text().await.unwrap_or_default();

            // Prefer the provider's own error message when the body parses
            if let Ok(error_response) =
                serde_json::from_str::<CompletionErrorResponse>(&error_text)
            {
                error!(
                    "Completion API error ({}): {}",
                    status, error_response.error.message
                );
                anyhow::bail!("Completion API error: {}", error_response.error.message);
            }

            error!("Completion API request failed: {} - {}", status, error_text);
            anyhow::bail!("Completion API request failed: {}", status);
        }
    }
}

#[async_trait]
impl CompletionProvider for CompletionClient {
    async fn complete(&self, messages: Vec<CompletionMessage>) -> Result<String> {
        debug!(
            "Sending completion request with {} messages",
            messages.len()
        );

        let request = CompletionRequest {
            model: self.settings.upstream.model.clone(),
            messages,
            temperature: self.settings.upstream.temperature,
            max_tokens: self.settings.upstream.max_tokens,
        };

        let url = format!("{}/chat/completions", self.settings.upstream.base_url);

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.settings.upstream.api_key),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send completion request")?;

        let completion = self.handle_response(response).await?;

        let reply = match completion.first_content() {
            Some(content) => content.to_string(),
            None => {
                warn!("Completion response carried no content, using fallback reply");
                EMPTY_REPLY_FALLBACK.to_string()
            }
        };

        Ok(reply)
    }
}
