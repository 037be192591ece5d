//! Test helpers for building gateway contexts against mock backends

use crate::mock_providers::MockBackend;
use futures::TryStreamExt;
use gateway_core::{CodeStream, GatewayError, GenerationRequest, ProviderId};
use gateway_providers::{CredentialSource, EndpointOverride, ProviderRegistry};
use gateway_resilience::{RateLimiterSet, RetryPolicy, RetryPolicyBuilder};
use gateway_routing::{GatewayContext, GatewayContextBuilder};
use std::time::Duration;

/// Credentials for every provider
pub fn test_credentials() -> CredentialSource {
    CredentialSource::from_pairs(ProviderId::ALL.map(|id| (id, "test-key")))
}

/// Registry whose adapters point at the given mock backends
pub fn registry_for(backends: &[&MockBackend]) -> ProviderRegistry {
    backends
        .iter()
        .fold(ProviderRegistry::new(test_credentials()), |registry, backend| {
            registry.with_endpoint(
                backend.provider,
                EndpointOverride {
                    base_url: Some(backend.url()),
                    timeout: Duration::from_secs(5),
                },
            )
        })
}

/// Stream retry policy with millisecond delays
pub fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicyBuilder::new()
        .max_attempts(max_attempts)
        .initial_delay(Duration::from_millis(10))
        .max_delay(Duration::from_millis(50))
        .jitter(0.0)
        .build()
}

/// Context builder wired to the mock backends with fast retries
pub fn context_builder(backends: &[&MockBackend]) -> GatewayContextBuilder {
    GatewayContext::builder()
        .registry(registry_for(backends))
        .limiters(RateLimiterSet::with_defaults())
        .retry_policy(fast_retry(3))
        .stream_retry_policy(fast_retry(2))
}

/// Context wired to the mock backends with fast retries
pub fn context_for(backends: &[&MockBackend]) -> GatewayContext {
    context_builder(backends).build()
}

/// Run a generation and collect its text
pub async fn generate_text(
    context: &GatewayContext,
    model: &str,
    prompt: &str,
) -> Result<String, GatewayError> {
    let stream = context
        .generate(&GenerationRequest::new(model, prompt))
        .await?;
    collect_text(stream).await
}

/// Concatenate a stream's chunks as UTF-8
pub async fn collect_text(stream: CodeStream) -> Result<String, GatewayError> {
    let chunks: Vec<bytes::Bytes> = stream.try_collect().await?;
    Ok(chunks
        .iter()
        .map(|chunk| String::from_utf8_lossy(chunk))
        .collect())
}
