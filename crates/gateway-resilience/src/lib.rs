//! # Gateway Resilience
//!
//! Resilience patterns for the code generation gateway:
//! - Retry policy with exponential backoff and jitter
//! - Per-provider token bucket rate limiting

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod rate_limit;
pub mod retry;

// Re-export main types
pub use rate_limit::{RateLimitConfig, RateLimiterSet, TokenBucket};
pub use retry::{Backoff, RetryConfig, RetryPolicy, RetryPolicyBuilder, RetryResult};
