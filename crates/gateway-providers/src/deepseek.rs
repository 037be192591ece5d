//! DeepSeek chat completions provider.
//!
//! The wire protocol is OpenAI's. Output goes through the import corrector
//! before it reaches the caller.

use crate::corrector::correct_imports;
use crate::http::{build_client, send};
use crate::openai::ChatCompletionRequest;
use crate::settings::ProviderSettings;
use crate::sse::{chat_completion_delta, decode_events};
use async_trait::async_trait;
use gateway_core::{CodeProvider, CodeStream, GatewayError, GenerateOptions, ProviderId};
use reqwest::Client;
use secrecy::ExposeSecret;
use tracing::debug;

/// Public DeepSeek API host
pub const DEEPSEEK_API_BASE: &str = "https://api.deepseek.com";

/// Models routed to DeepSeek
pub const DEEPSEEK_MODELS: &[&str] = &["deepseek-chat"];

const DEFAULT_MODEL: &str = "deepseek-chat";

/// Appended to every prompt so the response opens with its imports
pub const IMPORT_INSTRUCTION: &str = "\n\nIMPORTANT: Your response must start with proper import statements using the 'import' keyword. For example: 'import React, { useState } from \"react\";'";

/// DeepSeek provider
#[derive(Debug)]
pub struct DeepSeekProvider {
    settings: ProviderSettings,
    client: Client,
    endpoint: String,
}

impl DeepSeekProvider {
    /// Create a new DeepSeek provider
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(settings: ProviderSettings) -> Result<Self, GatewayError> {
        let client = build_client(ProviderId::DeepSeek, settings.timeout)?;
        let endpoint = format!("{}/v1/chat/completions", settings.base_url_or(DEEPSEEK_API_BASE));
        Ok(Self {
            settings,
            client,
            endpoint,
        })
    }
}

#[async_trait]
impl CodeProvider for DeepSeekProvider {
    fn provider_id(&self) -> ProviderId {
        ProviderId::DeepSeek
    }

    fn supported_models(&self) -> &'static [&'static str] {
        DEEPSEEK_MODELS
    }

    async fn generate_stream(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<CodeStream, GatewayError> {
        let model = options.model_or(DEFAULT_MODEL);
        debug!(model = %model, "Sending DeepSeek streaming request");

        let prompt = format!("{prompt}{IMPORT_INSTRUCTION}");
        let request = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.settings.api_key.expose_secret())
            .json(&ChatCompletionRequest::user(model, &prompt));

        let response = send(ProviderId::DeepSeek, request).await?;
        let events = decode_events(ProviderId::DeepSeek, response, |data| {
            chat_completion_delta(ProviderId::DeepSeek, data)
        });
        Ok(correct_imports(events))
    }
}
