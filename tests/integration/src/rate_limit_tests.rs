//! Rate limiting around backend calls

use crate::helpers::*;
use crate::mock_providers::*;
use gateway_core::ProviderId;
use gateway_resilience::{RateLimitConfig, RateLimiterSet};
use std::time::{Duration, Instant};

#[tokio::test]
async fn test_every_attempt_takes_a_token() {
    let openai = MockBackend::start(ProviderId::OpenAI).await;
    openai.mock_failures(503, 1).await;
    openai.mock_stream(&["ok"]).await;

    let limiters = RateLimiterSet::new()
        .with_provider(ProviderId::OpenAI, RateLimitConfig::new(10.0, Duration::from_secs(3600)));
    let context = context_builder(&[&openai]).limiters(limiters).build();

    generate_text(&context, "gpt-4", "p").await.unwrap();

    let available = context
        .limiters()
        .bucket(ProviderId::OpenAI)
        .unwrap()
        .available();
    assert!((7.9..8.1).contains(&available), "available = {available}");
}

#[tokio::test]
async fn test_requests_beyond_the_burst_wait() {
    let grok = MockBackend::start(ProviderId::Grok).await;
    grok.mock_stream(&["ok"]).await;

    let limiters = RateLimiterSet::new()
        .with_provider(ProviderId::Grok, RateLimitConfig::new(10.0, Duration::from_secs(1)).with_burst_limit(2.0));
    let context = context_builder(&[&grok]).limiters(limiters).build();

    let start = Instant::now();
    for _ in 0..4 {
        generate_text(&context, "grok-1", "p").await.unwrap();
    }

    // Two tokens beyond the burst at 10/s
    assert!(start.elapsed() >= Duration::from_millis(150));
    assert_eq!(grok.calls().await, 4);
}

#[tokio::test]
async fn test_provider_without_quota_is_a_configuration_error() {
    let openai = MockBackend::start(ProviderId::OpenAI).await;
    openai.mock_stream(&["unused"]).await;

    let context = context_builder(&[&openai])
        .limiters(RateLimiterSet::new())
        .build();
    let err = generate_text(&context, "gpt-4", "p").await.unwrap_err();

    assert!(matches!(err, gateway_core::GatewayError::Configuration { .. }));
    assert_eq!(openai.calls().await, 0);
}
