//! Fixed-window rate limiting
//!
//! Bounds request volume per client identifier before any upstream work
//! happens. State is process-local and intentionally not persisted;
//! counts reset to empty on restart.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Window duration for request counting
pub const WINDOW: Duration = Duration::from_secs(15 * 60);

/// Maximum requests admitted per window
pub const MAX_REQUESTS: u32 = 20;

/// How often expired records are garbage-collected
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Rate limiter configuration
///
/// Fixed for the deployed service; tests construct shorter windows.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Window duration
    pub window: Duration,
    /// Maximum requests per window
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: WINDOW,
            max_requests: MAX_REQUESTS,
        }
    }
}

/// Outcome of a rate-limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    /// Whether the request is admitted
    pub allowed: bool,
    /// Requests allowed per window
    pub limit: u32,
    /// Requests left in the current window
    pub remaining: u32,
    /// Epoch milliseconds when the current window ends
    pub reset_ms: u64,
}

impl RateDecision {
    /// Whole seconds until the window resets, rounded up
    pub fn retry_after_secs(&self, now_ms: u64) -> u64 {
        self.reset_ms.saturating_sub(now_ms).div_ceil(1000)
    }
}

/// Per-client window state
#[derive(Debug, Clone)]
struct RateRecord {
    /// Requests observed in the current window
    count: u32,
    /// Epoch milliseconds when the window ends
    reset_ms: u64,
}

/// Rate limiter port
///
/// Handlers depend on this trait so the in-memory store can be swapped
/// for a shared external one, or for a test double.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Count a request against `key` and decide whether to admit it
    async fn check(&self, key: &str) -> RateDecision;
}

/// In-memory fixed-window rate limiter
///
/// A mutex-guarded map keyed by client identifier. Per-key
/// read-modify-write is serialized by the lock, so concurrent requests
/// from the same client cannot lose updates. The sweeper takes the same
/// lock; a record swept mid-window is simply recreated on the next check.
#[derive(Debug)]
pub struct MemoryRateLimiter {
    config: RateLimitConfig,
    records: Mutex<HashMap<String, RateRecord>>,
}

impl MemoryRateLimiter {
    /// Create a limiter with the given configuration
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            records: Mutex::new(HashMap::new()),
        }
    }

    /// Check `key` against the window ending relative to `now_ms`
    ///
    /// Deterministic given current state and time; cannot fail.
    pub fn check_at(&self, key: &str, now_ms: u64) -> RateDecision {
        let max = self.config.max_requests;
        let mut records = self.records.lock().expect("rate limit store poisoned");

        match records.get_mut(key) {
            // Expired windows restart exactly like unknown clients
            Some(record) if now_ms <= record.reset_ms => {
                if record.count >= max {
                    RateDecision {
                        allowed: false,
                        limit: max,
                        remaining: 0,
                        reset_ms: record.reset_ms,
                    }
                } else {
                    record.count += 1;
                    RateDecision {
                        allowed: true,
                        limit: max,
                        remaining: max - record.count,
                        reset_ms: record.reset_ms,
                    }
                }
            }
            _ => {
                let reset_ms = now_ms + self.config.window.as_millis() as u64;
                records.insert(
                    key.to_string(),
                    RateRecord {
                        count: 1,
                        reset_ms,
                    },
                );
                RateDecision {
                    allowed: true,
                    limit: max,
                    remaining: max - 1,
                    reset_ms,
                }
            }
        }
    }

    /// Drop every record whose window has passed; returns how many
    pub fn sweep_at(&self, now_ms: u64) -> usize {
        let mut records = self.records.lock().expect("rate limit store poisoned");
        let before = records.len();
        records.retain(|_, record| now_ms <= record.reset_ms);
        before - records.len()
    }

    /// Sweep against the current wall clock
    pub fn sweep(&self) -> usize {
        self.sweep_at(epoch_ms())
    }

    /// Number of client identifiers currently tracked
    pub fn tracked_clients(&self) -> usize {
        self.records.lock().expect("rate limit store poisoned").len()
    }
}

#[async_trait]
impl RateLimiter for MemoryRateLimiter {
    async fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, epoch_ms())
    }
}

/// Spawn the background sweep task for `limiter`
///
/// Runs until the process exits; bounds memory growth from one-time or
/// abandoned clients.
pub fn spawn_sweeper(limiter: Arc<MemoryRateLimiter>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        // the first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            let removed = limiter.sweep();
            if removed > 0 {
                debug!(
                    "Rate limit sweep removed {} expired records, {} tracked",
                    removed,
                    limiter.tracked_clients()
                );
            }
        }
    })
}

/// Current wall clock as epoch milliseconds
fn epoch_ms() -> u64 {
    chrono::Utc::now().timestamp_millis() as u64
}
