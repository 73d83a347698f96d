//! Shared test fixtures
//!
//! Stub collaborators and router helpers used across the suites

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use axum::Router;
use chatrelay::config::settings::*;
use chatrelay::handlers::build_router;
use chatrelay::models::upstream::CompletionMessage;
use chatrelay::services::{
    CompletionProvider, MemoryRateLimiter, RateLimitConfig, RateLimiter,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Settings that pass validation without touching the environment
pub fn test_settings() -> Settings {
    Settings {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
        },
        upstream: UpstreamConfig {
            api_key: "test-key-1234567890".to_string(),
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            timeout: 30,
            temperature: 0.7,
            max_tokens: 500,
        },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
            environment: "production".to_string(),
        },
        logging: LoggingConfig {
            level: "info".to_string(),
            format: "text".to_string(),
        },
    }
}

/// Canned-reply provider that counts how often it is called and records
/// the message lists it receives
pub struct StubProvider {
    reply: String,
    calls: AtomicUsize,
    requests: Mutex<Vec<Vec<CompletionMessage>>>,
}

impl StubProvider {
    pub fn new(reply: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.into(),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<Vec<CompletionMessage>> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CompletionProvider for StubProvider {
    async fn complete(&self, messages: Vec<CompletionMessage>) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(messages);
        Ok(self.reply.clone())
    }
}

/// Provider that always fails, standing in for an upstream outage
pub struct FailingProvider {
    calls: AtomicUsize,
}

impl FailingProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionProvider for FailingProvider {
    async fn complete(&self, _messages: Vec<CompletionMessage>) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("Completion API request failed: 504 Gateway Timeout")
    }
}

/// Router wired with the given provider and a fresh default limiter
pub fn app_with_provider(provider: Arc<dyn CompletionProvider>) -> Router {
    build_router(
        test_settings(),
        provider,
        Arc::new(MemoryRateLimiter::new(RateLimitConfig::default())),
    )
}

/// Router with full control over provider and limiter
pub fn app_with(
    settings: Settings,
    provider: Arc<dyn CompletionProvider>,
    limiter: Arc<dyn RateLimiter>,
) -> Router {
    build_router(settings, provider, limiter)
}

/// JSON body for a valid chat request
pub fn chat_body(message: &str) -> String {
    serde_json::json!({
        "message": message,
        "sessionId": "test-session",
    })
    .to_string()
}
