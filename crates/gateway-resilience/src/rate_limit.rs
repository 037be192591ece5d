//! Per-provider token bucket rate limiting.
//!
//! Each provider owns an independent bucket. Acquisition never fails for a
//! configured provider; it only delays the caller until the bucket has
//! refilled enough.

use gateway_core::{GatewayError, ProviderId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Quota for a single provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitConfig {
    /// Tokens replenished per interval
    pub tokens_per_interval: f64,
    /// Replenishment interval
    pub interval: Duration,
    /// Bucket capacity; defaults to `tokens_per_interval`
    pub burst_limit: Option<f64>,
}

impl RateLimitConfig {
    /// Create a quota of `tokens_per_interval` tokens every `interval`
    #[must_use]
    pub fn new(tokens_per_interval: f64, interval: Duration) -> Self {
        Self {
            tokens_per_interval,
            interval,
            burst_limit: None,
        }
    }

    /// Set the burst limit
    #[must_use]
    pub fn with_burst_limit(mut self, burst_limit: f64) -> Self {
        self.burst_limit = Some(burst_limit);
        self
    }

    /// Bucket capacity
    #[must_use]
    pub fn capacity(&self) -> f64 {
        self.burst_limit.unwrap_or(self.tokens_per_interval)
    }

    /// Tokens added per millisecond
    #[must_use]
    pub fn refill_rate_per_ms(&self) -> f64 {
        let interval_ms = self.interval.as_secs_f64() * 1000.0;
        if interval_ms <= 0.0 {
            return f64::INFINITY;
        }
        self.tokens_per_interval / interval_ms
    }

    /// Published quota for a provider
    #[must_use]
    pub fn default_for(provider: ProviderId) -> Self {
        let minute = Duration::from_secs(60);
        match provider {
            ProviderId::OpenAI | ProviderId::Anthropic => {
                Self::new(50.0, minute).with_burst_limit(100.0)
            }
            ProviderId::Google => Self::new(60.0, minute).with_burst_limit(120.0),
            ProviderId::DeepSeek => Self::new(40.0, minute).with_burst_limit(80.0),
            ProviderId::Grok => Self::new(30.0, minute).with_burst_limit(60.0),
        }
    }
}

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

/// A single token bucket
#[derive(Debug)]
pub struct TokenBucket {
    capacity: f64,
    refill_rate_per_ms: f64,
    state: Mutex<BucketState>,
}

impl TokenBucket {
    /// Create a full bucket
    #[must_use]
    pub fn new(config: &RateLimitConfig) -> Self {
        let capacity = config.capacity().max(0.0);
        Self {
            capacity,
            refill_rate_per_ms: config.refill_rate_per_ms(),
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Bucket capacity
    #[must_use]
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Tokens currently available, after refilling
    #[must_use]
    pub fn available(&self) -> f64 {
        let mut state = self.state.lock();
        self.refill(&mut state);
        state.tokens
    }

    fn refill(&self, state: &mut BucketState) {
        let now = Instant::now();
        let elapsed_ms = now.duration_since(state.last_refill).as_secs_f64() * 1000.0;
        state.tokens = (state.tokens + elapsed_ms * self.refill_rate_per_ms).min(self.capacity);
        state.last_refill = now;
    }

    /// Debit `cost` tokens if available, otherwise return how long to wait.
    fn try_debit(&self, cost: f64) -> Option<Duration> {
        let mut state = self.state.lock();
        self.refill(&mut state);

        if state.tokens >= cost {
            state.tokens -= cost;
            return None;
        }

        let deficit = cost - state.tokens;
        let wait_secs = deficit / self.refill_rate_per_ms / 1000.0;
        Some(Duration::try_from_secs_f64(wait_secs).unwrap_or(Duration::MAX))
    }

    /// Wait until `cost` tokens are available, then debit them.
    ///
    /// After sleeping the debit is unconditional, so concurrent waiters can
    /// leave the bucket briefly negative.
    pub async fn acquire(&self, cost: f64) {
        let Some(wait) = self.try_debit(cost) else {
            return;
        };

        debug!(wait_ms = wait.as_millis(), cost = cost, "Waiting for rate limit tokens");
        tokio::time::sleep(wait).await;

        let mut state = self.state.lock();
        self.refill(&mut state);
        state.tokens -= cost;
    }
}

/// Token buckets keyed by provider
#[derive(Debug, Default)]
pub struct RateLimiterSet {
    buckets: HashMap<ProviderId, TokenBucket>,
}

impl RateLimiterSet {
    /// Create an empty set; every acquisition fails until providers are added
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set with the published quota for every provider
    #[must_use]
    pub fn with_defaults() -> Self {
        ProviderId::ALL
            .into_iter()
            .fold(Self::new(), |set, id| {
                set.with_provider(id, RateLimitConfig::default_for(id))
            })
    }

    /// Add or replace a provider's bucket
    #[must_use]
    pub fn with_provider(mut self, provider: ProviderId, config: RateLimitConfig) -> Self {
        self.buckets.insert(provider, TokenBucket::new(&config));
        self
    }

    /// Bucket for a provider, if configured
    #[must_use]
    pub fn bucket(&self, provider: ProviderId) -> Option<&TokenBucket> {
        self.buckets.get(&provider)
    }

    /// Wait for `cost` tokens from the provider's bucket.
    ///
    /// # Errors
    /// Returns a configuration error if the provider has no bucket
    pub async fn acquire(&self, provider: ProviderId, cost: f64) -> Result<(), GatewayError> {
        let bucket = self.buckets.get(&provider).ok_or_else(|| {
            GatewayError::configuration(format!(
                "No rate limiter configured for provider: {provider}"
            ))
        })?;
        bucket.acquire(cost).await;
        Ok(())
    }
}
