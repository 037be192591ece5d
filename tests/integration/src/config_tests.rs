//! Gateway context built from a parsed configuration file

use crate::helpers::*;
use crate::mock_providers::*;
use gateway_config::{ConfigFormat, GatewayConfig};
use gateway_core::ProviderId;
use gateway_routing::GatewayContext;
use pretty_assertions::assert_eq;

fn yaml_for(backend: &MockBackend) -> String {
    format!(
        r"
request_timeout: 30s
retry:
  initial_delay: 10ms
  max_delay: 50ms
stream_retry_attempts: 2
providers:
  openai:
    base_url: {}
    timeout: 5s
rate_limits:
  openai:
    tokens_per_interval: 10
    interval: 1h
",
        backend.url()
    )
}

#[tokio::test]
async fn test_context_from_yaml_config() {
    let openai = MockBackend::start(ProviderId::OpenAI).await;
    openai.mock_failures(503, 1).await;
    openai.mock_stream(&["from config"]).await;

    let config = GatewayConfig::parse(&yaml_for(&openai), ConfigFormat::Yaml).unwrap();
    config.check().unwrap();
    let context = GatewayContext::from_config(&config, test_credentials());

    let text = generate_text(&context, "gpt-4", "p").await.unwrap();

    assert_eq!(text, "from config");
    assert_eq!(openai.calls().await, 2);
    assert_eq!(context.request_timeout().as_secs(), 30);

    // The configured quota, minus one token per attempt
    let available = context
        .limiters()
        .bucket(ProviderId::OpenAI)
        .unwrap()
        .available();
    assert!((7.9..8.1).contains(&available), "available = {available}");
}
