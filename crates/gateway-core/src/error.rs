//! Error taxonomy for the gateway.
//!
//! Every failure that can cross a component boundary is a [`GatewayError`].
//! The variants carry enough context for the retry coordinator to classify
//! them and for the HTTP layer to pick a status code.

use crate::provider::ProviderId;
use std::time::Duration;
use thiserror::Error;

/// Result alias used throughout the gateway crates.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// HTTP statuses that are worth another attempt.
pub const RETRYABLE_STATUS_CODES: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// Errors produced by the gateway.
#[derive(Error, Debug, Clone)]
pub enum GatewayError {
    /// The requested model is not routable to any provider.
    #[error("Unsupported model: {model}")]
    UnsupportedModel {
        /// The model identifier that was requested.
        model: String,
    },

    /// A provider credential is absent from process configuration.
    #[error("{env_var} is required for the {provider} provider")]
    MissingCredential {
        /// Provider whose adapter could not be built.
        provider: ProviderId,
        /// Environment variable that was expected to hold the secret.
        env_var: String,
    },

    /// Gateway misconfiguration.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the problem.
        message: String,
    },

    /// The backend rejected our credential.
    #[error("Authentication failed for {provider}: {message}")]
    Authentication {
        /// Backend that rejected the request.
        provider: ProviderId,
        /// Message decoded from the backend error body.
        message: String,
    },

    /// The backend throttled the request.
    #[error("Rate limit exceeded for {provider}{}", .retry_after.map(|d| format!(". Try again after {} seconds", d.as_secs())).unwrap_or_default())]
    RateLimit {
        /// Backend that throttled the request.
        provider: ProviderId,
        /// Retry-after hint, when the backend supplied one.
        retry_after: Option<Duration>,
    },

    /// Transport failure talking to the backend.
    #[error("Network error for {provider}: {message}")]
    Network {
        /// Backend being contacted.
        provider: ProviderId,
        /// Transport error description.
        message: String,
    },

    /// Generic backend failure.
    #[error("{provider} API error: {message}")]
    Provider {
        /// Backend that failed.
        provider: ProviderId,
        /// Message decoded from the backend, or a description of the failure.
        message: String,
        /// HTTP status, when the failure came from a response.
        status_code: Option<u16>,
    },

    /// The inbound request is malformed.
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the request.
        message: String,
    },

    /// The end-to-end request deadline elapsed.
    #[error("Request timed out after {}s", .timeout.as_secs())]
    Timeout {
        /// The configured deadline.
        timeout: Duration,
    },

    /// Unexpected internal failure.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the failure.
        message: String,
    },
}

impl GatewayError {
    /// Create an unsupported model error
    pub fn unsupported_model(model: impl Into<String>) -> Self {
        Self::UnsupportedModel {
            model: model.into(),
        }
    }

    /// Create a missing credential error
    pub fn missing_credential(provider: ProviderId) -> Self {
        Self::MissingCredential {
            provider,
            env_var: provider.credential_env_var().to_string(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an authentication error
    pub fn authentication(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::Authentication {
            provider,
            message: message.into(),
        }
    }

    /// Create a backend rate limit error
    pub fn rate_limit(provider: ProviderId, retry_after: Option<Duration>) -> Self {
        Self::RateLimit {
            provider,
            retry_after,
        }
    }

    /// Create a network error
    pub fn network(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::Network {
            provider,
            message: message.into(),
        }
    }

    /// Create a provider error
    pub fn provider(
        provider: ProviderId,
        message: impl Into<String>,
        status_code: Option<u16>,
    ) -> Self {
        Self::Provider {
            provider,
            message: message.into(),
            status_code,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(timeout: Duration) -> Self {
        Self::Timeout { timeout }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether another attempt could succeed.
    ///
    /// Configuration faults, authentication failures and non-listed 4xx
    /// statuses are fatal.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } | Self::RateLimit { .. } => true,
            Self::Provider { status_code, .. } => {
                status_code.is_some_and(|code| RETRYABLE_STATUS_CODES.contains(&code))
            }
            _ => false,
        }
    }

    /// Whether the failure originated at a backend rather than in the gateway.
    #[must_use]
    pub fn is_backend(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. }
                | Self::RateLimit { .. }
                | Self::Network { .. }
                | Self::Provider { .. }
        )
    }

    /// Whether the caller is at fault (bad input or an unusable model choice).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedModel { .. } | Self::MissingCredential { .. } | Self::Validation { .. }
        )
    }

    /// HTTP status reported by the backend, if any.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Authentication { .. } => Some(401),
            Self::RateLimit { .. } => Some(429),
            Self::Provider { status_code, .. } => *status_code,
            _ => None,
        }
    }

    /// Retry-after hint supplied by a throttling backend.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimit { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Provider the error is attributed to.
    #[must_use]
    pub fn provider_id(&self) -> Option<ProviderId> {
        match self {
            Self::MissingCredential { provider, .. }
            | Self::Authentication { provider, .. }
            | Self::RateLimit { provider, .. }
            | Self::Network { provider, .. }
            | Self::Provider { provider, .. } => Some(*provider),
            _ => None,
        }
    }

    /// Short machine-readable kind, used in error bodies and log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedModel { .. } => "unsupported_model",
            Self::MissingCredential { .. } => "missing_credential",
            Self::Configuration { .. } => "configuration_error",
            Self::Authentication { .. } => "authentication_error",
            Self::RateLimit { .. } => "rate_limit_error",
            Self::Network { .. } => "network_error",
            Self::Provider { .. } => "provider_error",
            Self::Validation { .. } => "validation_error",
            Self::Timeout { .. } => "timeout",
            Self::Internal { .. } => "internal_error",
        }
    }
}
