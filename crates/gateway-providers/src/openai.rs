//! OpenAI chat completions provider.
//!
//! Also home to the chat-completions wire body, which DeepSeek and Grok
//! accept unchanged.

use crate::http::{build_client, send};
use crate::settings::ProviderSettings;
use crate::sse::{chat_completion_delta, decode_events};
use async_trait::async_trait;
use gateway_core::{CodeProvider, CodeStream, GatewayError, GenerateOptions, ProviderId};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::debug;

/// Public OpenAI API host
pub const OPENAI_API_BASE: &str = "https://api.openai.com";

/// Models routed to OpenAI
pub const OPENAI_MODELS: &[&str] = &[
    "gpt-4-turbo-preview",
    "gpt-4",
    "gpt-3.5-turbo",
    "gpt-4-vision-preview",
];

const DEFAULT_MODEL: &str = "gpt-4-turbo-preview";

/// Streaming chat completion request body
#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [WireMessage<'a>; 1],
    stream: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> ChatCompletionRequest<'a> {
    /// Single user turn, streamed
    pub(crate) fn user(model: &'a str, content: &'a str) -> Self {
        Self {
            model,
            messages: [WireMessage {
                role: "user",
                content,
            }],
            stream: true,
        }
    }
}

/// OpenAI provider
#[derive(Debug)]
pub struct OpenAIProvider {
    settings: ProviderSettings,
    client: Client,
    endpoint: String,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(settings: ProviderSettings) -> Result<Self, GatewayError> {
        let client = build_client(ProviderId::OpenAI, settings.timeout)?;
        let endpoint = format!("{}/v1/chat/completions", settings.base_url_or(OPENAI_API_BASE));
        Ok(Self {
            settings,
            client,
            endpoint,
        })
    }

    /// Chat completions URL
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CodeProvider for OpenAIProvider {
    fn provider_id(&self) -> ProviderId {
        ProviderId::OpenAI
    }

    fn supported_models(&self) -> &'static [&'static str] {
        OPENAI_MODELS
    }

    async fn generate_stream(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<CodeStream, GatewayError> {
        let model = options.model_or(DEFAULT_MODEL);
        debug!(model = %model, "Sending OpenAI streaming request");

        let request = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.settings.api_key.expose_secret())
            .header("OpenAI-Beta", "assistants=v1")
            .json(&ChatCompletionRequest::user(model, prompt));

        let response = send(ProviderId::OpenAI, request).await?;
        Ok(decode_events(ProviderId::OpenAI, response, |data| {
            chat_completion_delta(ProviderId::OpenAI, data)
        }))
    }
}
