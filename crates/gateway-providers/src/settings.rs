//! Adapter settings and credential lookup.

use gateway_core::{GatewayError, ProviderId};
use secrecy::SecretString;
use std::collections::HashMap;
use std::time::Duration;

/// Default HTTP timeout for backend calls
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Where adapter credentials come from
#[derive(Debug, Clone, Default)]
pub enum CredentialSource {
    /// Read `<PROVIDER>_API_KEY` style variables from the process environment
    #[default]
    Environment,
    /// Fixed secrets, keyed by provider
    Static(HashMap<ProviderId, SecretString>),
}

impl CredentialSource {
    /// Build a static source from `(provider, secret)` pairs
    #[must_use]
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (ProviderId, S)>,
        S: Into<String>,
    {
        Self::Static(
            pairs
                .into_iter()
                .map(|(id, secret)| (id, SecretString::new(secret.into())))
                .collect(),
        )
    }

    /// Look up the secret for a provider.
    ///
    /// Empty values count as absent.
    ///
    /// # Errors
    /// Returns `MissingCredential` when no usable secret exists
    pub fn credential(&self, provider: ProviderId) -> Result<SecretString, GatewayError> {
        match self {
            Self::Environment => std::env::var(provider.credential_env_var())
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map(SecretString::new)
                .ok_or_else(|| GatewayError::missing_credential(provider)),
            Self::Static(secrets) => secrets
                .get(&provider)
                .cloned()
                .ok_or_else(|| GatewayError::missing_credential(provider)),
        }
    }
}

/// Everything an adapter needs to reach its backend
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Backend API key
    pub api_key: SecretString,
    /// Override for the backend's public endpoint
    pub base_url: Option<String>,
    /// HTTP client timeout
    pub timeout: Duration,
}

impl ProviderSettings {
    /// Settings using the public endpoint and default timeout
    #[must_use]
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Point the adapter at a different host
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the HTTP timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL without a trailing slash
    pub(crate) fn base_url_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.base_url
            .as_deref()
            .unwrap_or(default)
            .trim_end_matches('/')
    }
}
