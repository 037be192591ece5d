//! Retry policy with exponential backoff.
//!
//! Provides bounded retry with 0-10% additive jitter for retryable errors.
//! Fatal errors (authentication, configuration, most 4xx) propagate after the
//! first attempt.

use gateway_core::GatewayError;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Backoff multiplier
    pub backoff_factor: f64,
    /// Maximum additive jitter as a fraction of the current delay (0.0 - 1.0)
    pub jitter: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10_000),
            backoff_factor: 2.0,
            jitter: 0.1,
        }
    }
}

impl RetryConfig {
    /// Defaults for stream-returning operations.
    ///
    /// Only connection establishment is retried, so fewer attempts are made.
    #[must_use]
    pub fn for_streams() -> Self {
        Self {
            max_attempts: 2,
            ..Self::default()
        }
    }
}

/// Per-call backoff state
#[derive(Debug, Clone)]
pub struct Backoff {
    attempt: u32,
    current_delay: Duration,
    max_delay: Duration,
    backoff_factor: f64,
    jitter: f64,
}

impl Backoff {
    /// Start a fresh backoff sequence
    #[must_use]
    pub fn new(config: &RetryConfig) -> Self {
        Self {
            attempt: 1,
            current_delay: config.initial_delay.min(config.max_delay),
            max_delay: config.max_delay,
            backoff_factor: config.backoff_factor.max(1.0),
            jitter: config.jitter.clamp(0.0, 1.0),
        }
    }

    /// Current attempt number (1-based)
    #[must_use]
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Sleep duration before the next attempt; advances the state.
    pub fn next_delay(&mut self) -> Duration {
        let jitter = self
            .current_delay
            .mul_f64(rand::thread_rng().gen_range(0.0..=self.jitter));
        let delay = (self.current_delay + jitter).min(self.max_delay);

        self.current_delay = self
            .current_delay
            .mul_f64(self.backoff_factor)
            .min(self.max_delay);
        self.attempt += 1;

        delay
    }
}

/// Retry policy implementation
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    /// Create a new retry policy with the given configuration
    #[must_use]
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Create with default configuration
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(RetryConfig::default())
    }

    /// Create with the stream defaults
    #[must_use]
    pub fn for_streams() -> Self {
        Self::new(RetryConfig::for_streams())
    }

    /// Create a policy with custom max attempts
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self::new(RetryConfig {
            max_attempts,
            ..Default::default()
        })
    }

    /// Run an operation, classifying failures with `is_retryable`.
    ///
    /// Returns the full outcome, including the delays slept between attempts.
    pub async fn run_with<F, Fut, T, C>(&self, operation: F, is_retryable: C) -> RetryResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, GatewayError>>,
        C: Fn(&GatewayError) -> bool,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut backoff = Backoff::new(&self.config);
        let mut delays = Vec::new();

        loop {
            let attempt = backoff.attempt();
            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(attempt = attempt, "Retry succeeded");
                    }
                    return RetryResult::Success {
                        value,
                        attempts: attempt,
                        delays,
                    };
                }
                Err(error) => {
                    if !is_retryable(&error) {
                        return RetryResult::NonRetryable {
                            error,
                            attempts: attempt,
                        };
                    }
                    if attempt >= max_attempts {
                        return RetryResult::Exhausted {
                            error,
                            attempts: attempt,
                            delays,
                        };
                    }

                    let delay = backoff.next_delay();
                    warn!(
                        attempt = attempt,
                        max_attempts = max_attempts,
                        delay_ms = delay.as_millis(),
                        error = %error,
                        "Attempt failed, retrying"
                    );

                    tokio::time::sleep(delay).await;
                    delays.push(delay);
                }
            }
        }
    }

    /// Run an operation with the default classification
    pub async fn run<F, Fut, T>(&self, operation: F) -> RetryResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, GatewayError>>,
    {
        self.run_with(operation, GatewayError::is_retryable).await
    }

    /// Execute an operation with retry logic
    ///
    /// # Errors
    /// Returns the last error if all attempts are exhausted, or the first
    /// non-retryable error
    pub async fn execute<F, Fut, T>(&self, operation: F) -> Result<T, GatewayError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, GatewayError>>,
    {
        self.run(operation).await.into_result()
    }

    /// Execute with a caller-supplied classification
    ///
    /// # Errors
    /// Returns the last error if all attempts are exhausted, or the first
    /// error `is_retryable` rejects
    pub async fn execute_with<F, Fut, T, C>(
        &self,
        operation: F,
        is_retryable: C,
    ) -> Result<T, GatewayError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, GatewayError>>,
        C: Fn(&GatewayError) -> bool,
    {
        self.run_with(operation, is_retryable).await.into_result()
    }

    /// Get the configuration
    #[must_use]
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Result of a retry operation
#[derive(Debug)]
pub enum RetryResult<T> {
    /// Operation succeeded
    Success {
        /// The value returned
        value: T,
        /// Number of attempts made
        attempts: u32,
        /// Delays slept before each retry
        delays: Vec<Duration>,
    },
    /// Operation kept failing with retryable errors
    Exhausted {
        /// The final error
        error: GatewayError,
        /// Number of attempts made
        attempts: u32,
        /// Delays slept before each retry
        delays: Vec<Duration>,
    },
    /// Operation failed with non-retryable error
    NonRetryable {
        /// The error
        error: GatewayError,
        /// Number of attempts made
        attempts: u32,
    },
}

impl<T> RetryResult<T> {
    /// Convert to a Result
    ///
    /// # Errors
    /// Returns the error if the operation failed
    pub fn into_result(self) -> Result<T, GatewayError> {
        match self {
            Self::Success { value, .. } => Ok(value),
            Self::Exhausted { error, .. } | Self::NonRetryable { error, .. } => Err(error),
        }
    }

    /// Check if the operation succeeded
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Number of attempts made
    #[must_use]
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Success { attempts, .. }
            | Self::Exhausted { attempts, .. }
            | Self::NonRetryable { attempts, .. } => *attempts,
        }
    }

    /// Delays slept between attempts
    #[must_use]
    pub fn delays(&self) -> &[Duration] {
        match self {
            Self::Success { delays, .. } | Self::Exhausted { delays, .. } => delays,
            Self::NonRetryable { .. } => &[],
        }
    }
}

/// Builder for retry policy
#[derive(Debug, Default)]
pub struct RetryPolicyBuilder {
    config: RetryConfig,
}

impl RetryPolicyBuilder {
    /// Create a new builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set max attempts
    #[must_use]
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.config.max_attempts = n;
        self
    }

    /// Set the initial delay
    #[must_use]
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.config.initial_delay = delay;
        self
    }

    /// Set max delay
    #[must_use]
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.config.max_delay = delay;
        self
    }

    /// Set backoff multiplier
    #[must_use]
    pub fn backoff_factor(mut self, factor: f64) -> Self {
        self.config.backoff_factor = factor;
        self
    }

    /// Set jitter fraction
    #[must_use]
    pub fn jitter(mut self, jitter: f64) -> Self {
        self.config.jitter = jitter.clamp(0.0, 1.0);
        self
    }

    /// Build the policy
    #[must_use]
    pub fn build(self) -> RetryPolicy {
        RetryPolicy::new(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_core::ProviderId;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn unavailable() -> GatewayError {
        GatewayError::provider(ProviderId::OpenAI, "unavailable", Some(503))
    }

    #[test]
    fn test_backoff_without_jitter() {
        let mut backoff = Backoff::new(&RetryConfig {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(300),
            backoff_factor: 2.0,
            jitter: 0.0,
            ..Default::default()
        });

        assert_eq!(backoff.next_delay(), Duration::from_millis(100));
        assert_eq!(backoff.next_delay(), Duration::from_millis(200));
        assert_eq!(backoff.next_delay(), Duration::from_millis(300)); // Capped
        assert_eq!(backoff.next_delay(), Duration::from_millis(300));
        assert_eq!(backoff.attempt(), 5);
    }

    #[test]
    fn test_backoff_jitter_bounds() {
        let config = RetryConfig::default();
        for _ in 0..100 {
            let mut backoff = Backoff::new(&config);
            let first = backoff.next_delay();
            assert!(first >= Duration::from_millis(1000));
            assert!(first <= Duration::from_millis(1100));

            let second = backoff.next_delay();
            assert!(second >= Duration::from_millis(2000));
            assert!(second <= Duration::from_millis(2200));
        }
    }

    #[test]
    fn test_default_config() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.initial_delay, Duration::from_secs(1));
        assert_eq!(config.max_delay, Duration::from_secs(10));
        assert_eq!(RetryConfig::for_streams().max_attempts, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_success_first_attempt() {
        let policy = RetryPolicy::with_max_attempts(3);
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = Arc::clone(&counter);

        let result = policy
            .run(|| {
                let c = Arc::clone(&counter_clone);
                async move {
                    c.fetch_add(1, Ordering::Relaxed);
                    Ok::<_, GatewayError>(42)
                }
            })
            .await;

        assert!(result.is_success());
        assert!(result.delays().is_empty());
        assert_eq!(result.into_result().unwrap(), 42);
        assert_eq!(counter.load(Ordering::Relaxed), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_success_after_failures_records_delays() {
        let config = RetryConfig::default();
        let policy = RetryPolicy::new(config.clone());
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = Arc::clone(&counter);

        let result = policy
            .run(|| {
                let c = Arc::clone(&counter_clone);
                async move {
                    let attempt = c.fetch_add(1, Ordering::Relaxed);
                    if attempt < 2 {
                        Err(unavailable())
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(result.attempts(), 3);
        let delays = result.delays().to_vec();
        assert_eq!(delays.len(), 2);

        let mut prior = config.initial_delay;
        for delay in &delays {
            assert!(*delay >= prior);
            assert!(*delay <= config.max_delay);
            assert!(delay.as_secs_f64() <= prior.as_secs_f64() * 1.1 + 1e-9);
            prior = prior.mul_f64(config.backoff_factor).min(config.max_delay);
        }

        assert_eq!(result.into_result().unwrap(), 42);
        assert_eq!(counter.load(Ordering::Relaxed), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_exhausted() {
        let policy = RetryPolicy::new(RetryConfig {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            jitter: 0.0,
            ..Default::default()
        });
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = Arc::clone(&counter);

        let result: Result<u32, GatewayError> = policy
            .execute(|| {
                let c = Arc::clone(&counter_clone);
                async move {
                    c.fetch_add(1, Ordering::Relaxed);
                    Err(unavailable())
                }
            })
            .await;

        assert!(matches!(
            result,
            Err(GatewayError::Provider {
                status_code: Some(503),
                ..
            })
        ));
        assert_eq!(counter.load(Ordering::Relaxed), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_error_attempted_once() {
        let policy = RetryPolicy::with_max_attempts(3);
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = Arc::clone(&counter);

        let result = policy
            .run(|| {
                let c = Arc::clone(&counter_clone);
                async move {
                    c.fetch_add(1, Ordering::Relaxed);
                    Err::<u32, _>(GatewayError::authentication(ProviderId::OpenAI, "bad key"))
                }
            })
            .await;

        assert!(matches!(result, RetryResult::NonRetryable { attempts: 1, .. }));
        assert_eq!(counter.load(Ordering::Relaxed), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_classifier() {
        let policy = RetryPolicy::with_max_attempts(3);
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = Arc::clone(&counter);

        let result: Result<u32, GatewayError> = policy
            .execute_with(
                || {
                    let c = Arc::clone(&counter_clone);
                    async move {
                        c.fetch_add(1, Ordering::Relaxed);
                        Err(unavailable())
                    }
                },
                |_| false,
            )
            .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_builder() {
        let policy = RetryPolicyBuilder::new()
            .max_attempts(5)
            .initial_delay(Duration::from_millis(200))
            .max_delay(Duration::from_secs(30))
            .backoff_factor(3.0)
            .jitter(1.5)
            .build();

        assert_eq!(policy.config().max_attempts, 5);
        assert_eq!(policy.config().initial_delay, Duration::from_millis(200));
        assert_eq!(policy.config().max_delay, Duration::from_secs(30));
        assert!((policy.config().backoff_factor - 3.0).abs() < 0.001);
        assert!((policy.config().jitter - 1.0).abs() < 0.001);
    }
}
