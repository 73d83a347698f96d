//! Service layer module
//!
//! Contains the rate limiter, upstream completion client, prompt
//! assembly, and reply post-processing

pub mod client;
pub mod limiter;
pub mod prompt;
pub mod reply;

pub use client::{CompletionClient, CompletionProvider, EMPTY_REPLY_FALLBACK};
pub use limiter::{
    spawn_sweeper, MemoryRateLimiter, RateDecision, RateLimitConfig, RateLimiter,
};
