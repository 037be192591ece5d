//! Anthropic messages API provider.

use crate::http::{build_client, send};
use crate::settings::ProviderSettings;
use crate::sse::{anthropic_delta, decode_events};
use async_trait::async_trait;
use gateway_core::{CodeProvider, CodeStream, GatewayError, GenerateOptions, ProviderId};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::debug;

/// Public Anthropic API host
pub const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com";

/// API version header value
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Models routed to Anthropic
pub const ANTHROPIC_MODELS: &[&str] = &["claude-3-opus-20240229", "claude-3-sonnet-20240229"];

const DEFAULT_MODEL: &str = "claude-3-opus-20240229";
const MAX_TOKENS: u32 = 4000;

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    messages: [UserMessage<'a>; 1],
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Anthropic provider
#[derive(Debug)]
pub struct AnthropicProvider {
    settings: ProviderSettings,
    client: Client,
    endpoint: String,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(settings: ProviderSettings) -> Result<Self, GatewayError> {
        let client = build_client(ProviderId::Anthropic, settings.timeout)?;
        let endpoint = format!("{}/v1/messages", settings.base_url_or(ANTHROPIC_API_BASE));
        Ok(Self {
            settings,
            client,
            endpoint,
        })
    }
}

#[async_trait]
impl CodeProvider for AnthropicProvider {
    fn provider_id(&self) -> ProviderId {
        ProviderId::Anthropic
    }

    fn supported_models(&self) -> &'static [&'static str] {
        ANTHROPIC_MODELS
    }

    async fn generate_stream(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<CodeStream, GatewayError> {
        let model = options.model_or(DEFAULT_MODEL);
        debug!(model = %model, "Sending Anthropic streaming request");

        let body = MessagesRequest {
            model,
            messages: [UserMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: MAX_TOKENS,
            stream: true,
        };

        let request = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", self.settings.api_key.expose_secret().as_str())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body);

        let response = send(ProviderId::Anthropic, request).await?;
        Ok(decode_events(ProviderId::Anthropic, response, anthropic_delta))
    }
}
