//! Logging middleware
//!
//! Records HTTP request and response information

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

/// Request logging middleware
///
/// Records a start and completion line for each HTTP request under a
/// per-request span.
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let start_time = Instant::now();
    let request_id = Uuid::new_v4();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let span = info_span!(
        "http_request",
        request_id = %request_id,
        method = %method,
        path = %path,
    );

    async move {
        info!("Request started: {} {}", method, path);

        let response = next.run(request).await;

        let duration = start_time.elapsed();
        let status = response.status();

        if status.is_success() {
            info!(
                "Request completed: {} - Duration: {:.2}ms",
                status,
                duration.as_secs_f64() * 1000.0
            );
        } else if status.is_client_error() {
            warn!(
                "Client error: {} - Duration: {:.2}ms",
                status,
                duration.as_secs_f64() * 1000.0
            );
        } else {
            warn!(
                "Server error: {} - Duration: {:.2}ms",
                status,
                duration.as_secs_f64() * 1000.0
            );
        }

        // Upstream calls are bounded at 30s; anything past 5s is worth noting
        if duration.as_secs() > 5 {
            warn!(
                "Slow request detected: {} {} - Duration: {:.2}s",
                method,
                path,
                duration.as_secs_f64()
            );
        }

        response
    }
    .instrument(span)
    .await
}
