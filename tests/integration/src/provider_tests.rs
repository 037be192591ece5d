//! Provider adapter integration tests
//!
//! Each adapter is built by the registry, pointed at a mock backend, and
//! driven through the gateway context.

use crate::helpers::*;
use crate::mock_providers::*;
use gateway_core::ProviderId;
use gateway_providers::corrector::CANONICAL_IMPORT;
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_openai_stream() {
    let backend = MockBackend::start(ProviderId::OpenAI).await;
    backend.mock_stream(&["const ", "x = 1;"]).await;

    let context = context_for(&[&backend]);
    let text = generate_text(&context, "gpt-4-turbo-preview", "p").await.unwrap();

    assert_eq!(text, "const x = 1;");
    let bodies = backend.request_bodies().await;
    assert_eq!(bodies[0]["model"], "gpt-4-turbo-preview");
    assert_eq!(bodies[0]["stream"], true);
}

#[tokio::test]
async fn test_anthropic_stream() {
    let backend = MockBackend::start(ProviderId::Anthropic).await;
    backend.mock_stream(&["import ", "React"]).await;

    let context = context_for(&[&backend]);
    let text = generate_text(&context, "claude-3-sonnet-20240229", "p")
        .await
        .unwrap();

    assert_eq!(text, "import React");
    let bodies = backend.request_bodies().await;
    assert_eq!(bodies[0]["max_tokens"], 4000);
}

#[tokio::test]
async fn test_google_stream() {
    let backend = MockBackend::start(ProviderId::Google).await;
    backend.mock_stream(&["export ", "default App;"]).await;

    let context = context_for(&[&backend]);
    let text = generate_text(&context, "gemini-pro", "p").await.unwrap();

    assert_eq!(text, "export default App;");
    let bodies = backend.request_bodies().await;
    assert_eq!(bodies[0]["contents"][0]["parts"][0]["text"], "p");
}

#[tokio::test]
async fn test_grok_stream() {
    let backend = MockBackend::start(ProviderId::Grok).await;
    backend.mock_stream(&["let y;"]).await;

    let context = context_for(&[&backend]);
    let text = generate_text(&context, "grok-1", "p").await.unwrap();

    assert_eq!(text, "let y;");
    assert_eq!(backend.request_bodies().await[0]["model"], "grok-1");
}

#[tokio::test]
async fn test_deepseek_imports_are_corrected() {
    let backend = MockBackend::start(ProviderId::DeepSeek).await;
    backend
        .mock_stream(&[
            "const x = 1;\n",
            "import React, { useState } from \"react\";\n",
            "export default x;",
        ])
        .await;

    let context = context_for(&[&backend]);
    let text = generate_text(&context, "deepseek-chat", "make a counter")
        .await
        .unwrap();

    assert_eq!(text.matches("import React").count(), 1);
    assert!(text.starts_with(CANONICAL_IMPORT));
    assert!(text.contains("const x = 1;"));
    assert!(text.ends_with("export default x;"));

    let bodies = backend.request_bodies().await;
    let prompt = bodies[0]["messages"][0]["content"].as_str().unwrap();
    assert!(prompt.starts_with("make a counter"));
    assert!(prompt.len() > "make a counter".len());
}

#[tokio::test]
async fn test_non_event_stream_body_is_a_provider_error() {
    let backend = MockBackend::start(ProviderId::OpenAI).await;
    wiremock::Mock::given(wiremock::matchers::method("POST"))
        .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&backend.server)
        .await;

    let context = context_for(&[&backend]);
    let err = generate_text(&context, "gpt-4", "p").await.unwrap_err();

    assert!(matches!(
        err,
        gateway_core::GatewayError::Provider {
            provider: ProviderId::OpenAI,
            ..
        }
    ));
}
