//! Provider abstraction.
//!
//! A provider adapter turns a prompt into a lazily produced stream of UTF-8
//! code fragments. All five backends implement [`CodeProvider`]; which one
//! serves a request is decided by the model catalog.

use crate::error::GatewayError;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lazy stream of generated code, one chunk per decoded backend fragment.
pub type CodeStream = BoxStream<'static, Result<Bytes, GatewayError>>;

/// Backend family identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// OpenAI chat completions
    OpenAI,
    /// Anthropic messages API
    Anthropic,
    /// Google generative language API
    Google,
    /// DeepSeek chat completions
    DeepSeek,
    /// xAI Grok chat completions
    Grok,
}

impl ProviderId {
    /// All provider families, in a stable order.
    pub const ALL: [Self; 5] = [
        Self::OpenAI,
        Self::Anthropic,
        Self::Google,
        Self::DeepSeek,
        Self::Grok,
    ];

    /// Lowercase name used in logs, config keys and error messages
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Anthropic => "anthropic",
            Self::Google => "google",
            Self::DeepSeek => "deepseek",
            Self::Grok => "grok",
        }
    }

    /// Environment variable holding this provider's secret
    #[must_use]
    pub const fn credential_env_var(self) -> &'static str {
        match self {
            Self::OpenAI => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::Google => "GOOGLE_AI_API_KEY",
            Self::DeepSeek => "DEEPSEEK_API_KEY",
            Self::Grok => "GROK_API_KEY",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| GatewayError::configuration(format!("Unknown provider: {s}")))
    }
}

/// Static description of a provider family and the models it serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderDescriptor {
    /// Provider family
    pub provider_id: ProviderId,
    /// Model identifiers routed to this provider
    pub supported_models: &'static [&'static str],
}

/// Per-call generation options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Model to request; adapters fall back to their default when absent
    pub model: Option<String>,
}

impl GenerateOptions {
    /// Options selecting a specific model
    #[must_use]
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            model: Some(model.into()),
        }
    }

    /// The requested model, or `default` when none was given
    #[must_use]
    pub fn model_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.model.as_deref().unwrap_or(default)
    }
}

/// Capability shared by every backend adapter.
///
/// Implementations must be cheap to share: the registry hands the same
/// instance to every concurrent request.
#[async_trait]
pub trait CodeProvider: Send + Sync {
    /// Provider family served by this adapter
    fn provider_id(&self) -> ProviderId;

    /// Model identifiers this adapter accepts
    fn supported_models(&self) -> &'static [&'static str];

    /// Start a generation and return the decoded output stream.
    ///
    /// The returned future resolves once the backend has accepted the
    /// request; errors up to that point are classified for the retry
    /// coordinator. Bytes are only pulled from the backend as the stream is
    /// polled.
    ///
    /// # Errors
    /// Returns an error if the backend cannot be reached or rejects the request
    async fn generate_stream(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<CodeStream, GatewayError>;
}
