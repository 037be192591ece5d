//! HTTP API tests against mock backends

use crate::helpers::*;
use crate::mock_providers::*;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use gateway_core::ProviderId;
use gateway_server::{create_router, AppState};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

fn generate(body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/generateCode")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_body(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_generate_code_streams_backend_text() {
    let anthropic = MockBackend::start(ProviderId::Anthropic).await;
    anthropic
        .mock_stream(&["import React from 'react';\n", "export default () => null;"])
        .await;

    let app = create_router(AppState::new(context_for(&[&anthropic])));
    let response = app
        .oneshot(generate(&json!({
            "model": "claude-3-opus-20240229",
            "messages": [{"role": "user", "content": "an empty component"}]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_body(response).await,
        "import React from 'react';\nexport default () => null;"
    );
}

#[tokio::test]
async fn test_generate_code_reports_exhausted_retries() {
    let openai = MockBackend::start(ProviderId::OpenAI).await;
    openai.mock_error(503, "Service temporarily unavailable").await;

    let app = create_router(AppState::new(context_for(&[&openai])));
    let response = app
        .oneshot(generate(&json!({
            "model": "gpt-4",
            "messages": [{"role": "user", "content": "x"}]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json: Value = serde_json::from_str(&read_body(response).await).unwrap();
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .starts_with("API Error: "));
    assert_eq!(openai.calls().await, 2);
}

#[tokio::test]
async fn test_unknown_model_is_unprocessable() {
    let openai = MockBackend::start(ProviderId::OpenAI).await;

    let app = create_router(AppState::new(context_for(&[&openai])));
    let response = app
        .oneshot(generate(&json!({
            "model": "foo-bar",
            "messages": [{"role": "user", "content": "x"}]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(openai.calls().await, 0);
}
