//! Google Gemini provider.
//!
//! Uses the Google AI Studio streaming endpoint:
//! `https://generativelanguage.googleapis.com/v1beta/models/{MODEL}:streamGenerateContent?alt=sse`
//!
//! Each streamed `GenerateContentResponse` carries a fragment of text in its
//! first candidate; that text is forwarded as-is.

use crate::http::{build_client, send};
use crate::settings::ProviderSettings;
use crate::sse::{decode_events, SseStep};
use async_trait::async_trait;
use gateway_core::{CodeProvider, CodeStream, GatewayError, GenerateOptions, ProviderId};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Public Google AI Studio host
pub const GOOGLE_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Models routed to Google
pub const GOOGLE_MODELS: &[&str] = &["gemini-pro"];

const DEFAULT_MODEL: &str = "gemini-pro";

/// Google Gemini provider
#[derive(Debug)]
pub struct GoogleProvider {
    settings: ProviderSettings,
    client: Client,
    base_url: String,
}

impl GoogleProvider {
    /// Create a new Google provider
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(settings: ProviderSettings) -> Result<Self, GatewayError> {
        let client = build_client(ProviderId::Google, settings.timeout)?;
        let base_url = settings.base_url_or(GOOGLE_API_BASE).to_string();
        Ok(Self {
            settings,
            client,
            base_url,
        })
    }

    /// Streaming URL for a model, without the query string
    fn endpoint_url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:streamGenerateContent", self.base_url)
    }

    fn transform_request(prompt: &str) -> GoogleRequest<'_> {
        GoogleRequest {
            contents: [GoogleContent {
                role: "user",
                parts: [GooglePart { text: prompt }],
            }],
        }
    }

    /// Text of the first candidate in one streamed response
    fn extract_text(data: &str) -> SseStep {
        let response = match serde_json::from_str::<GoogleResponse>(data) {
            Ok(response) => response,
            Err(e) => {
                warn!(provider = "google", error = %e, "Skipping malformed stream event");
                return SseStep::Skip;
            }
        };

        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            SseStep::Skip
        } else {
            SseStep::Emit(text)
        }
    }
}

#[async_trait]
impl CodeProvider for GoogleProvider {
    fn provider_id(&self) -> ProviderId {
        ProviderId::Google
    }

    fn supported_models(&self) -> &'static [&'static str] {
        GOOGLE_MODELS
    }

    async fn generate_stream(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<CodeStream, GatewayError> {
        let model = options.model_or(DEFAULT_MODEL);
        debug!(model = %model, "Sending Google streaming request");

        let request = self
            .client
            .post(self.endpoint_url(model))
            .query(&[
                ("alt", "sse"),
                ("key", self.settings.api_key.expose_secret().as_str()),
            ])
            .json(&Self::transform_request(prompt));

        let response = send(ProviderId::Google, request).await?;
        Ok(decode_events(ProviderId::Google, response, Self::extract_text))
    }
}

// Google API Types

#[derive(Debug, Serialize)]
struct GoogleRequest<'a> {
    contents: [GoogleContent<'a>; 1],
}

#[derive(Debug, Serialize)]
struct GoogleContent<'a> {
    role: &'static str,
    parts: [GooglePart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct GooglePart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    candidates: Vec<GoogleCandidate>,
}

#[derive(Debug, Deserialize)]
struct GoogleCandidate {
    #[serde(default)]
    content: Option<GoogleResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GoogleResponseContent {
    #[serde(default)]
    parts: Vec<GoogleResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GoogleResponsePart {
    #[serde(default)]
    text: Option<String>,
}
