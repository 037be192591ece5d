//! Mock LLM backends for integration testing
//!
//! Wiremock servers that speak each provider's streaming wire format.

use gateway_core::ProviderId;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockBuilder, MockServer, ResponseTemplate};

/// A mock backend for one provider
pub struct MockBackend {
    pub server: MockServer,
    pub provider: ProviderId,
}

impl MockBackend {
    /// Start a mock server for `provider`
    pub async fn start(provider: ProviderId) -> Self {
        Self {
            server: MockServer::start().await,
            provider,
        }
    }

    /// Base URL for this mock server
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Number of requests the backend received
    pub async fn calls(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map_or(0, |requests| requests.len())
    }

    /// JSON bodies of every request received so far
    pub async fn request_bodies(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|request| serde_json::from_slice(&request.body).ok())
            .collect()
    }

    fn endpoint(&self) -> MockBuilder {
        let given = Mock::given(method("POST"));
        match self.provider {
            ProviderId::OpenAI | ProviderId::DeepSeek => given.and(path("/v1/chat/completions")),
            ProviderId::Grok => given.and(path("/v1/grok/chat/completions")),
            ProviderId::Anthropic => given.and(path("/v1/messages")),
            ProviderId::Google => {
                given.and(path_regex(r"^/v1beta/models/[^/]+:streamGenerateContent$"))
            }
        }
    }

    /// Stream `chunks` as text deltas in this provider's event format
    pub async fn mock_stream(&self, chunks: &[&str]) {
        self.endpoint()
            .respond_with(stream_response(self.provider, chunks))
            .mount(&self.server)
            .await;
    }

    /// Answer the first `times` requests with `status`, then fall through
    /// to whatever is mounted next
    pub async fn mock_failures(&self, status: u16, times: u64) {
        self.endpoint()
            .respond_with(error_response(status, "Service temporarily unavailable"))
            .up_to_n_times(times)
            .with_priority(1)
            .mount(&self.server)
            .await;
    }

    /// Answer every request with `status`
    pub async fn mock_error(&self, status: u16, message: &str) {
        self.endpoint()
            .respond_with(error_response(status, message))
            .mount(&self.server)
            .await;
    }

    /// Throttle with a Retry-After header, once
    pub async fn mock_rate_limit_once(&self, retry_after_secs: u64) {
        self.endpoint()
            .respond_with(
                error_response(429, "Rate limit exceeded")
                    .append_header("Retry-After", retry_after_secs.to_string().as_str()),
            )
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&self.server)
            .await;
    }
}

/// A 200 `text/event-stream` response carrying `chunks`
pub fn stream_response(provider: ProviderId, chunks: &[&str]) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(sse_body(provider, chunks), "text/event-stream")
}

/// Provider-shaped SSE body for `chunks`
pub fn sse_body(provider: ProviderId, chunks: &[&str]) -> String {
    let mut body = String::new();
    match provider {
        ProviderId::OpenAI | ProviderId::DeepSeek | ProviderId::Grok => {
            for chunk in chunks {
                let event = json!({"choices": [{"index": 0, "delta": {"content": chunk}}]});
                body.push_str(&format!("data: {event}\n\n"));
            }
            body.push_str("data: [DONE]\n\n");
        }
        ProviderId::Anthropic => {
            body.push_str("event: message_start\ndata: {\"type\":\"message_start\"}\n\n");
            for chunk in chunks {
                let event = json!({
                    "type": "content_block_delta",
                    "index": 0,
                    "delta": {"type": "text_delta", "text": chunk}
                });
                body.push_str(&format!("event: content_block_delta\ndata: {event}\n\n"));
            }
            body.push_str("event: message_stop\ndata: {\"type\":\"message_stop\"}\n\n");
        }
        ProviderId::Google => {
            for chunk in chunks {
                let event = json!({
                    "candidates": [{"content": {"parts": [{"text": chunk}], "role": "model"}}]
                });
                body.push_str(&format!("data: {event}\n\n"));
            }
        }
    }
    body
}

/// JSON error body in the `{"error": {"message"}}` shape most backends use
pub fn error_response(status: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "error": {"message": message, "type": "api_error"}
    }))
}
