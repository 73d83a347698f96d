//! HTTP handlers module
//!
//! Contains all HTTP endpoint handling logic

pub mod chat;
pub mod health;

use crate::config::Settings;
use crate::middleware::logging::request_logging_middleware;
use crate::services::limiter::SWEEP_INTERVAL;
use crate::services::{
    spawn_sweeper, CompletionClient, CompletionProvider, MemoryRateLimiter, RateLimitConfig,
    RateLimiter,
};
use anyhow::Result;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub provider: Arc<dyn CompletionProvider>,
    pub limiter: Arc<dyn RateLimiter>,
}

/// Create application router with production collaborators
///
/// Builds the real completion client, the in-memory rate limiter, and
/// spawns the limiter's background sweep task.
pub async fn create_router(settings: Settings) -> Result<Router> {
    let provider: Arc<dyn CompletionProvider> =
        Arc::new(CompletionClient::new(settings.clone())?);

    let limiter = Arc::new(MemoryRateLimiter::new(RateLimitConfig::default()));
    spawn_sweeper(limiter.clone(), SWEEP_INTERVAL);

    Ok(build_router(settings, provider, limiter))
}

/// Assemble the router from injected collaborators
///
/// Split out of [`create_router`] so tests can supply stub providers
/// and limiters.
pub fn build_router(
    settings: Settings,
    provider: Arc<dyn CompletionProvider>,
    limiter: Arc<dyn RateLimiter>,
) -> Router {
    let cors = cors_layer(&settings);

    let app_state = Arc::new(AppState {
        settings,
        provider,
        limiter,
    });

    // Create middleware stack
    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_logging_middleware))
        .layer(cors);

    Router::new()
        .route("/api/chat", post(chat::handle_chat))
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness_check))
        .with_state(app_state)
        .layer(middleware_stack)
}

/// CORS policy from the configured allow-list
///
/// Preflight requests are answered by the layer itself: the origin is
/// echoed only when it matches the allow-list. Development mode opens
/// every origin.
fn cors_layer(settings: &Settings) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if settings.is_dev_mode() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = settings
        .security
        .allowed_origins
        .iter()
        .filter_map(|origin| {
            origin
                .parse()
                .map_err(|_| warn!("Ignoring malformed allowed origin: {}", origin))
                .ok()
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
}
