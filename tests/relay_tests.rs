//! Chat relay behavior tests
//!
//! Focus on the relay pipeline: what reaches the provider, what never
//! does, and how replies come back out

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use common::*;
use tower::ServiceExt;

fn chat_request_json(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_oversized_message_never_reaches_upstream() {
    let provider = StubProvider::new("ok");
    let app = app_with_provider(provider.clone());

    let body = serde_json::json!({
        "message": "x".repeat(501),
        "sessionId": "s1",
    });

    let response = app.oneshot(chat_request_json(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"], "Message too long (max 500 characters)");
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_whitespace_message_never_reaches_upstream() {
    let provider = StubProvider::new("ok");
    let app = app_with_provider(provider.clone());

    let body = serde_json::json!({"message": "   ", "sessionId": "s1"});
    let response = app.oneshot(chat_request_json(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_split_fidelity_end_to_end() {
    let provider = StubProvider::new("A|||B|||  C  ");
    let app = app_with_provider(provider);

    let body = serde_json::json!({"message": "Hi", "sessionId": "s1"});
    let response = app.oneshot(chat_request_json(body)).await.unwrap();

    let body = body_json(response).await;
    assert_eq!(body["messages"], serde_json::json!(["A", "B", "C"]));
}

#[tokio::test]
async fn test_reply_without_delimiter_is_one_bubble() {
    let provider = StubProvider::new("Just one answer.");
    let app = app_with_provider(provider);

    let body = serde_json::json!({"message": "Hi", "sessionId": "s1"});
    let response = app.oneshot(chat_request_json(body)).await.unwrap();

    let body = body_json(response).await;
    assert_eq!(body["messages"], serde_json::json!(["Just one answer."]));
}

#[tokio::test]
async fn test_prompt_reaches_provider_in_order() {
    let provider = StubProvider::new("ok");
    let app = app_with_provider(provider.clone());

    let body = serde_json::json!({
        "message": "And pricing?",
        "sessionId": "s1",
        "language": "es",
        "conversationHistory": [
            {"role": "user", "content": "What do you build?"},
            {"role": "assistant", "content": "Chatbots."}
        ]
    });
    app.oneshot(chat_request_json(body)).await.unwrap();

    let messages = provider.last_request().unwrap();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0].role, "system");
    assert!(messages[0].content.contains("SOLO en español"));
    assert_eq!(messages[1].role, "user");
    assert_eq!(messages[1].content, "What do you build?");
    assert_eq!(messages[2].role, "assistant");
    assert_eq!(messages[3].role, "user");
    assert_eq!(messages[3].content, "And pricing?");
}

#[tokio::test]
async fn test_unrecognized_language_falls_back_to_english() {
    let provider = StubProvider::new("ok");
    let app = app_with_provider(provider.clone());

    let body = serde_json::json!({
        "message": "Hallo",
        "sessionId": "s1",
        "language": "de"
    });
    let response = app.oneshot(chat_request_json(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let messages = provider.last_request().unwrap();
    assert!(messages[0].content.contains("ONLY in English"));
}

#[tokio::test]
async fn test_failed_upstream_call_still_consumes_quota() {
    use chatrelay::{MemoryRateLimiter, RateLimitConfig};
    use std::sync::Arc;

    let provider = FailingProvider::new();
    let limiter = Arc::new(MemoryRateLimiter::new(RateLimitConfig {
        window: std::time::Duration::from_secs(900),
        max_requests: 1,
    }));
    let app = app_with(test_settings(), provider.clone(), limiter);

    let body = serde_json::json!({"message": "Hi", "sessionId": "s1"});

    // The rate check ran before the upstream call, so the failed call
    // consumed the only slot in the window
    let response = app
        .clone()
        .oneshot(chat_request_json(body.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(provider.calls(), 1);

    let response = app.oneshot(chat_request_json(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_quota_consumption_visible_in_headers_across_requests() {
    let provider = StubProvider::new("ok");
    let app = app_with_provider(provider);

    let body = serde_json::json!({"message": "Hi", "sessionId": "s1"});

    let first = app
        .clone()
        .oneshot(chat_request_json(body.clone()))
        .await
        .unwrap();
    assert_eq!(first.headers()["x-ratelimit-remaining"], "19");

    let second = app.oneshot(chat_request_json(body)).await.unwrap();
    assert_eq!(second.headers()["x-ratelimit-remaining"], "18");
}
