//! The gateway context: adapter registry, rate limiters and retry policies
//! shared by every request.

use async_stream::stream;
use futures::StreamExt;
use gateway_config::{GatewayConfig, RateLimitSettings, RetrySettings};
use gateway_core::{
    CodeStream, GatewayError, GatewayResult, GenerateOptions, GenerationRequest, ProviderId,
};
use gateway_providers::{CredentialSource, EndpointOverride, ProviderRegistry};
use gateway_resilience::{RateLimitConfig, RateLimiterSet, RetryConfig, RetryPolicy};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, warn};

/// Default end-to-end deadline
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Shared state for code generation.
///
/// Built once at startup and handed to request handlers; nothing in it is
/// global.
#[derive(Debug)]
pub struct GatewayContext {
    registry: ProviderRegistry,
    limiters: RateLimiterSet,
    retry: RetryPolicy,
    stream_retry: RetryPolicy,
    request_timeout: Duration,
}

impl GatewayContext {
    /// Start building a context
    #[must_use]
    pub fn builder() -> GatewayContextBuilder {
        GatewayContextBuilder::new()
    }

    /// Build a context from loaded configuration
    #[must_use]
    pub fn from_config(config: &GatewayConfig, credentials: CredentialSource) -> Self {
        let registry = config.providers.iter().fold(
            ProviderRegistry::new(credentials),
            |registry, (provider, endpoint)| {
                registry.with_endpoint(
                    *provider,
                    EndpointOverride {
                        base_url: endpoint.base_url.clone(),
                        timeout: endpoint.timeout,
                    },
                )
            },
        );

        let limiters = ProviderId::ALL
            .into_iter()
            .fold(RateLimiterSet::new(), |set, provider| {
                let quota = config
                    .rate_limits
                    .get(&provider)
                    .map_or_else(|| RateLimitConfig::default_for(provider), quota_from);
                set.with_provider(provider, quota)
            });

        Self::builder()
            .registry(registry)
            .limiters(limiters)
            .retry_policy(RetryPolicy::new(retry_config(&config.retry, config.retry.max_attempts)))
            .stream_retry_policy(RetryPolicy::new(retry_config(
                &config.retry,
                config.stream_retry_attempts,
            )))
            .request_timeout(config.request_timeout)
            .build()
    }

    /// Adapter registry
    #[must_use]
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Per-provider rate limiters
    #[must_use]
    pub fn limiters(&self) -> &RateLimiterSet {
        &self.limiters
    }

    /// End-to-end deadline applied by [`Self::generate`]
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Run `operation` against `provider` under the general retry policy,
    /// taking one rate limit token per attempt.
    ///
    /// # Errors
    /// Returns the last error once retries are exhausted or a fatal error
    pub async fn with_provider_protection<T, F, Fut>(
        &self,
        provider: ProviderId,
        operation: F,
    ) -> GatewayResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = GatewayResult<T>>,
    {
        self.protect(provider, &self.retry, operation).await
    }

    async fn protect<T, F, Fut>(
        &self,
        provider: ProviderId,
        policy: &RetryPolicy,
        operation: F,
    ) -> GatewayResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = GatewayResult<T>>,
    {
        let operation = &operation;
        let limiters = &self.limiters;
        policy
            .execute(move || async move {
                limiters.acquire(provider, 1.0).await?;
                operation().await
            })
            .await
    }

    /// Start a generation and return its output stream.
    ///
    /// The model is resolved first, so unknown models and missing credentials
    /// fail before any backend call. Stream establishment is retried under
    /// the stream policy; once bytes flow nothing is retried. The request
    /// deadline covers both phases, and when it passes the stream ends with a
    /// timeout error and the backend connection is dropped.
    ///
    /// # Errors
    /// Returns an error if the model cannot be routed or the backend cannot
    /// start a stream in time
    pub async fn generate(&self, request: &GenerationRequest) -> GatewayResult<CodeStream> {
        let deadline = deadline_after(self.request_timeout);
        let adapter = self.registry.resolve(request.model_id())?;
        let provider = adapter.provider_id();
        let options = GenerateOptions::for_model(request.model_id());

        info!(provider = %provider, model = %request.model_id(), "Starting generation");

        let establish = self.protect(provider, &self.stream_retry, || {
            adapter.generate_stream(request.prompt_text(), &options)
        });

        let stream = match tokio::time::timeout_at(deadline, establish).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                error!(provider = %provider, error = %e, "Generation failed");
                return Err(e);
            }
            Err(_) => {
                error!(provider = %provider, "Generation timed out before streaming");
                return Err(GatewayError::timeout(self.request_timeout));
            }
        };

        Ok(with_deadline(stream, deadline, self.request_timeout))
    }
}

/// `timeout` from now, saturating at roughly thirty years out
fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout)
        .unwrap_or_else(|| now + FAR_FUTURE)
}

const FAR_FUTURE: Duration = Duration::from_secs(30 * 365 * 24 * 60 * 60);

/// End `inner` with a timeout error once `deadline` passes
fn with_deadline(mut inner: CodeStream, deadline: Instant, timeout: Duration) -> CodeStream {
    Box::pin(stream! {
        loop {
            match tokio::time::timeout_at(deadline, inner.next()).await {
                Ok(Some(item)) => yield item,
                Ok(None) => break,
                Err(_) => {
                    warn!(timeout_secs = timeout.as_secs(), "Request deadline elapsed mid-stream");
                    yield Err(GatewayError::timeout(timeout));
                    break;
                }
            }
        }
    })
}

fn quota_from(settings: &RateLimitSettings) -> RateLimitConfig {
    let quota = RateLimitConfig::new(settings.tokens_per_interval, settings.interval);
    match settings.burst_limit {
        Some(burst) => quota.with_burst_limit(burst),
        None => quota,
    }
}

fn retry_config(settings: &RetrySettings, max_attempts: u32) -> RetryConfig {
    RetryConfig {
        max_attempts,
        initial_delay: settings.initial_delay,
        max_delay: settings.max_delay,
        backoff_factor: settings.backoff_factor,
        ..RetryConfig::default()
    }
}

/// Builder for [`GatewayContext`]
#[derive(Debug)]
pub struct GatewayContextBuilder {
    registry: Option<ProviderRegistry>,
    limiters: Option<RateLimiterSet>,
    retry: RetryPolicy,
    stream_retry: RetryPolicy,
    request_timeout: Duration,
}

impl Default for GatewayContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GatewayContextBuilder {
    /// Defaults: environment credentials, published quotas, standard retry
    /// policies and a five minute deadline
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: None,
            limiters: None,
            retry: RetryPolicy::with_defaults(),
            stream_retry: RetryPolicy::for_streams(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Set the adapter registry
    #[must_use]
    pub fn registry(mut self, registry: ProviderRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Set the rate limiters
    #[must_use]
    pub fn limiters(mut self, limiters: RateLimiterSet) -> Self {
        self.limiters = Some(limiters);
        self
    }

    /// Set the general retry policy
    #[must_use]
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Set the stream establishment retry policy
    #[must_use]
    pub fn stream_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.stream_retry = policy;
        self
    }

    /// Set the end-to-end deadline
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Build the context
    #[must_use]
    pub fn build(self) -> GatewayContext {
        GatewayContext {
            registry: self.registry.unwrap_or_default(),
            limiters: self.limiters.unwrap_or_else(RateLimiterSet::with_defaults),
            retry: self.retry,
            stream_retry: self.stream_retry,
            request_timeout: self.request_timeout,
        }
    }
}
