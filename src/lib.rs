//! Chat Relay Library
//!
//! Rate-limited relay between a website chat widget and an upstream
//! chat-completion API

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

// Re-export common types
pub use config::Settings;
pub use handlers::{build_router, create_router, AppState};
pub use models::{chat, upstream};
pub use services::{
    CompletionClient, CompletionProvider, MemoryRateLimiter, RateDecision, RateLimitConfig,
    RateLimiter,
};
pub use utils::error::{AppError, AppResult};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get version information
pub fn version_info() -> String {
    format!("{} v{} - {}", NAME, VERSION, DESCRIPTION)
}
