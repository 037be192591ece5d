//! xAI Grok provider.

use crate::http::{build_client, send};
use crate::openai::ChatCompletionRequest;
use crate::settings::ProviderSettings;
use crate::sse::{chat_completion_delta, decode_events};
use async_trait::async_trait;
use gateway_core::{CodeProvider, CodeStream, GatewayError, GenerateOptions, ProviderId};
use reqwest::Client;
use secrecy::ExposeSecret;
use tracing::debug;

/// Public Grok API host
pub const GROK_API_BASE: &str = "https://api.x.com";

/// Version header value
pub const GROK_VERSION: &str = "2024-03";

/// Models routed to Grok
pub const GROK_MODELS: &[&str] = &["grok-1"];

/// Grok provider
///
/// The backend serves a single model, so the requested model is ignored.
#[derive(Debug)]
pub struct GrokProvider {
    settings: ProviderSettings,
    client: Client,
    endpoint: String,
}

impl GrokProvider {
    /// Create a new Grok provider
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(settings: ProviderSettings) -> Result<Self, GatewayError> {
        let client = build_client(ProviderId::Grok, settings.timeout)?;
        let endpoint = format!("{}/v1/grok/chat/completions", settings.base_url_or(GROK_API_BASE));
        Ok(Self {
            settings,
            client,
            endpoint,
        })
    }
}

#[async_trait]
impl CodeProvider for GrokProvider {
    fn provider_id(&self) -> ProviderId {
        ProviderId::Grok
    }

    fn supported_models(&self) -> &'static [&'static str] {
        GROK_MODELS
    }

    async fn generate_stream(
        &self,
        prompt: &str,
        _options: &GenerateOptions,
    ) -> Result<CodeStream, GatewayError> {
        debug!(model = "grok-1", "Sending Grok streaming request");

        let request = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.settings.api_key.expose_secret())
            .header("X-Grok-Version", GROK_VERSION)
            .json(&ChatCompletionRequest::user(GROK_MODELS[0], prompt));

        let response = send(ProviderId::Grok, request).await?;
        Ok(decode_events(ProviderId::Grok, response, |data| {
            chat_completion_delta(ProviderId::Grok, data)
        }))
    }
}
