//! Error handling module
//!
//! Defines error types and handling logic used in the project

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Generic user-safe text for server-side failures. Upstream detail is
/// logged, never sent to the widget.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Sorry, I encountered an error. Please try again later.";

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Request validation failed; the message is sent to the client
    #[error("{0}")]
    Validation(String),

    /// Rate limit exceeded for a client identifier
    #[error("Too many requests, please try again later.")]
    RateLimited {
        /// Seconds until the client's window resets
        retry_after_secs: u64,
        /// Requests allowed per window
        limit: u32,
        /// Epoch milliseconds when the window resets
        reset_ms: u64,
    },

    /// Upstream completion API returned non-success or failed on the wire
    #[error("Upstream completion request failed: {0}")]
    Upstream(String),

    /// Any unexpected failure during request handling
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Validation error response body: `{ "error": ... }`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Rate-limit error response body: `{ "error": ..., "retryAfter": ... }`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitBody {
    pub error: String,
    pub retry_after: u64,
}

/// Server failure response body: `{ "error": ..., "message": ... }`
#[derive(Debug, Serialize, Deserialize)]
pub struct FailureBody {
    pub error: String,
    pub message: String,
}

impl AppError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Config(_)
            | AppError::HttpClient(_)
            | AppError::Serialization(_)
            | AppError::Upstream(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error type string for logs
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "invalid_request_error",
            AppError::RateLimited { .. } => "rate_limit_error",
            AppError::Upstream(_) => "upstream_error",
            AppError::Config(_)
            | AppError::HttpClient(_)
            | AppError::Serialization(_)
            | AppError::Internal(_) => "internal_error",
        }
    }

    /// Whether detailed error information should be logged
    pub fn should_log_details(&self) -> bool {
        !matches!(self, AppError::Validation(_) | AppError::RateLimited { .. })
    }
}

/// Convert errors directly into the widget-facing HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if self.should_log_details() {
            tracing::error!("Request failed ({}): {}", self.error_type(), self);
        } else {
            tracing::warn!("Client error ({}): {}", self.error_type(), self);
        }

        match self {
            AppError::Validation(message) => {
                (status, Json(ErrorBody { error: message })).into_response()
            }
            AppError::RateLimited {
                retry_after_secs,
                limit,
                reset_ms,
            } => {
                let body = RateLimitBody {
                    error: "Too many requests, please try again later.".to_string(),
                    retry_after: retry_after_secs,
                };
                (
                    status,
                    [
                        (header::RETRY_AFTER, retry_after_secs.to_string()),
                        (
                            header::HeaderName::from_static("x-ratelimit-limit"),
                            limit.to_string(),
                        ),
                        (
                            header::HeaderName::from_static("x-ratelimit-remaining"),
                            "0".to_string(),
                        ),
                        (
                            header::HeaderName::from_static("x-ratelimit-reset"),
                            reset_ms.to_string(),
                        ),
                    ],
                    Json(body),
                )
                    .into_response()
            }
            // All server-side failures share one generic body
            _ => (
                status,
                Json(FailureBody {
                    error: "Internal server error".to_string(),
                    message: GENERIC_FAILURE_MESSAGE.to_string(),
                }),
            )
                .into_response(),
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Error handling helper functions
pub mod helpers {
    use super::*;

    /// Create validation error
    pub fn validation_error(message: impl Into<String>) -> AppError {
        AppError::Validation(message.into())
    }

    /// Create upstream error
    pub fn upstream_error(message: impl Into<String>) -> AppError {
        AppError::Upstream(message.into())
    }

    /// Create internal error
    pub fn internal_error(message: impl Into<String>) -> AppError {
        AppError::Internal(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            AppError::Validation("test".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::RateLimited {
                retry_after_secs: 30,
                limit: 20,
                reset_ms: 0
            }
            .status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::Upstream("boom".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Internal("test".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            AppError::Validation("test".to_string()).error_type(),
            "invalid_request_error"
        );
        assert_eq!(
            AppError::RateLimited {
                retry_after_secs: 1,
                limit: 20,
                reset_ms: 0
            }
            .error_type(),
            "rate_limit_error"
        );
        assert_eq!(
            AppError::Upstream("test".to_string()).error_type(),
            "upstream_error"
        );
    }

    #[test]
    fn test_client_faults_skip_detail_logging() {
        assert!(!AppError::Validation("x".to_string()).should_log_details());
        assert!(!AppError::RateLimited {
            retry_after_secs: 1,
            limit: 20,
            reset_ms: 0
        }
        .should_log_details());
        assert!(AppError::Upstream("x".to_string()).should_log_details());
        assert!(AppError::Internal("x".to_string()).should_log_details());
    }

    #[test]
    fn test_helpers() {
        assert!(matches!(
            helpers::validation_error("Missing field"),
            AppError::Validation(_)
        ));
        assert!(matches!(
            helpers::upstream_error("502"),
            AppError::Upstream(_)
        ));
        assert!(matches!(
            helpers::internal_error("oops"),
            AppError::Internal(_)
        ));
    }
}
