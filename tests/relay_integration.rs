//! Relay server integration tests
//!
//! The router runs in-process through `tower::ServiceExt::oneshot` with the
//! upstream chat-completion API replaced by a `wiremock` server.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use studyqa::prompts;
use studyqa::relay::{self, RelayState};

async fn post(app: axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("valid request"),
        )
        .await
        .expect("router never fails");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    let value = serde_json::from_slice(&bytes).expect("JSON body");
    (status, value)
}

fn router_for(server: &MockServer) -> axum::Router {
    let state = Arc::new(RelayState::new(Arc::new(common::provider_for(server))));
    relay::router(state, None)
}

async fn upstream_requests(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| serde_json::from_slice(&r.body).expect("JSON upstream body"))
        .collect()
}

#[tokio::test]
async fn test_ask_forwards_two_messages_and_returns_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::completion_body("4")))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = post(
        router_for(&server),
        "/ask",
        json!({"question": "2+2", "messages": [{"role": "user", "content": "ignored"}]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"answer": "4"}));

    let sent = upstream_requests(&server).await;
    let messages = sent[0]["messages"].as_array().expect("messages array");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "system");
    assert_eq!(messages[0]["content"], prompts::ASK_SYSTEM_PROMPT);
    assert_eq!(messages[1], json!({"role": "user", "content": "2+2"}));
    assert_eq!(sent[0]["model"], "deepseek-chat");
}

#[tokio::test]
async fn test_ask_forwards_history_when_enabled() {
    let server = common::mock_upstream("ok").await;
    let state = RelayState {
        provider: Arc::new(common::provider_for(&server)),
        forward_history: true,
    };
    let app = relay::router(Arc::new(state), None);

    let (status, _) = post(
        app,
        "/ask",
        json!({
            "question": "and 3+3?",
            "messages": [
                {"role": "user", "content": "2+2"},
                {"role": "assistant", "content": "4"},
                {"role": "user", "content": "and 3+3?"}
            ]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let sent = upstream_requests(&server).await;
    let messages = sent[0]["messages"].as_array().expect("messages array");
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0]["role"], "system");
    assert_eq!(messages[3]["content"], "and 3+3?");
}

#[tokio::test]
async fn test_missing_fields_return_400_without_upstream_call() {
    let server = common::mock_upstream("unused").await;

    let cases = [
        ("/ask", json!({}), "Question is required"),
        ("/ask", json!({"question": ""}), "Question is required"),
        ("/diagramise", json!({"text": ""}), "Text is required"),
        ("/plan", json!({"todos": []}), "Todos are required"),
        ("/plan", json!({"currentTime": "9:00 AM"}), "Todos are required"),
    ];

    for (uri, body, message) in cases {
        let (status, body) = post(router_for(&server), uri, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body, json!({"error": message}));
    }

    assert!(upstream_requests(&server).await.is_empty());
}

#[tokio::test]
async fn test_upstream_failure_returns_500() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let (status, body) = post(router_for(&server), "/diagramise", json!({"text": "cells"})).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Internal server error"}));
}

#[tokio::test]
async fn test_plan_sends_time_and_todos() {
    let server = common::mock_upstream("## Plan\n- 09:00 Read").await;

    let (status, body) = post(
        router_for(&server),
        "/plan",
        json!({
            "todos": [{"text": "Read", "dueTime": "09:00", "completed": false, "status": "pending"}],
            "currentTime": "3/5/2024, 8:00:00 AM"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"plan": "## Plan\n- 09:00 Read"}));

    let sent = upstream_requests(&server).await;
    assert_eq!(sent[0]["messages"][0]["content"], prompts::PLAN_SYSTEM_PROMPT);
    let user = sent[0]["messages"][1]["content"].as_str().expect("user turn");
    assert!(user.starts_with("Current time: 3/5/2024, 8:00:00 AM"));
    assert!(user.contains("\"dueTime\": \"09:00\""));
}

#[tokio::test]
async fn test_malformed_json_is_a_bad_request() {
    let server = common::mock_upstream("unused").await;
    let response = router_for(&server)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/ask")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .expect("valid request"),
        )
        .await
        .expect("router never fails");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
