//! Routing and retry through the gateway context

use crate::helpers::*;
use crate::mock_providers::*;
use gateway_core::{GatewayError, GenerationRequest, ProviderId};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_models_route_to_their_backends() {
    let openai = MockBackend::start(ProviderId::OpenAI).await;
    let anthropic = MockBackend::start(ProviderId::Anthropic).await;
    openai.mock_stream(&["from openai"]).await;
    anthropic.mock_stream(&["from anthropic"]).await;

    let context = context_for(&[&openai, &anthropic]);

    assert_eq!(
        generate_text(&context, "gpt-4", "p").await.unwrap(),
        "from openai"
    );
    assert_eq!(
        generate_text(&context, "claude-3-opus-20240229", "p")
            .await
            .unwrap(),
        "from anthropic"
    );
    assert_eq!(openai.calls().await, 1);
    assert_eq!(anthropic.calls().await, 1);
}

#[tokio::test]
async fn test_unknown_model_never_reaches_a_backend() {
    let openai = MockBackend::start(ProviderId::OpenAI).await;
    openai.mock_stream(&["unused"]).await;

    let context = context_for(&[&openai]);
    let err = context
        .generate(&GenerationRequest::new("foo-bar", "p"))
        .await
        .err()
        .unwrap();

    assert!(matches!(err, GatewayError::UnsupportedModel { ref model } if model == "foo-bar"));
    assert_eq!(openai.calls().await, 0);
}

#[tokio::test]
async fn test_service_unavailable_is_retried() {
    let openai = MockBackend::start(ProviderId::OpenAI).await;
    openai.mock_failures(503, 1).await;
    openai.mock_stream(&["recovered"]).await;

    let context = context_for(&[&openai]);
    let text = generate_text(&context, "gpt-4", "p").await.unwrap();

    assert_eq!(text, "recovered");
    assert_eq!(openai.calls().await, 2);
}

#[tokio::test]
async fn test_stream_attempts_are_bounded() {
    let openai = MockBackend::start(ProviderId::OpenAI).await;
    openai.mock_error(502, "Bad gateway").await;

    let context = context_for(&[&openai]);
    let err = generate_text(&context, "gpt-4", "p").await.unwrap_err();

    assert_eq!(err.status_code(), Some(502));
    assert_eq!(openai.calls().await, 2);
}

#[tokio::test]
async fn test_authentication_failure_is_not_retried() {
    let anthropic = MockBackend::start(ProviderId::Anthropic).await;
    anthropic.mock_error(401, "invalid x-api-key").await;

    let context = context_for(&[&anthropic]);
    let err = generate_text(&context, "claude-3-opus-20240229", "p")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GatewayError::Authentication {
            provider: ProviderId::Anthropic,
            ..
        }
    ));
    assert_eq!(anthropic.calls().await, 1);
}

#[tokio::test]
async fn test_backend_throttling_is_retried() {
    let google = MockBackend::start(ProviderId::Google).await;
    google.mock_rate_limit_once(1).await;
    google.mock_stream(&["ok"]).await;

    let context = context_for(&[&google]);
    let text = generate_text(&context, "gemini-pro", "p").await.unwrap();

    assert_eq!(text, "ok");
    assert_eq!(google.calls().await, 2);
}

#[tokio::test]
async fn test_bad_request_is_not_retried() {
    let deepseek = MockBackend::start(ProviderId::DeepSeek).await;
    deepseek.mock_error(400, "prompt too long").await;

    let context = context_for(&[&deepseek]);
    let err = generate_text(&context, "deepseek-chat", "p").await.unwrap_err();

    assert_eq!(err.status_code(), Some(400));
    assert!(err.to_string().contains("prompt too long"));
    assert_eq!(deepseek.calls().await, 1);
}

#[tokio::test]
async fn test_adapters_are_reused_across_requests() {
    let openai = MockBackend::start(ProviderId::OpenAI).await;
    openai.mock_stream(&["x"]).await;

    let context = context_for(&[&openai]);
    generate_text(&context, "gpt-4", "p").await.unwrap();
    generate_text(&context, "gpt-3.5-turbo", "p").await.unwrap();

    assert!(context.registry().is_cached(ProviderId::OpenAI));
    assert!(!context.registry().is_cached(ProviderId::Anthropic));
    assert_eq!(openai.calls().await, 2);
}
