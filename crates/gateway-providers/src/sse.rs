//! Server-sent event decoding shared by the HTTP backends.
//!
//! Every network read is decoded and split into lines on its own. A `data:`
//! line that straddles two reads is therefore seen as two fragments, and each
//! fragment goes through the per-backend extractor which will usually reject
//! it as malformed.

use async_stream::try_stream;
use bytes::Bytes;
use futures_util::StreamExt;
use gateway_core::{CodeStream, GatewayError, ProviderId};
use reqwest::Response;
use serde::Deserialize;
use tracing::{trace, warn};

/// What an extractor wants done with one `data:` payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseStep {
    /// Forward this text to the caller
    Emit(String),
    /// Nothing to forward
    Skip,
    /// The backend signalled completion
    Done,
}

/// One line of an event stream body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line<'a> {
    Data(&'a str),
    Field,
    Blank,
    Other,
}

fn classify_line(line: &str) -> Line<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Line::Blank;
    }
    if let Some(data) = line.strip_prefix("data:") {
        return Line::Data(data.trim());
    }
    if line.starts_with(':')
        || line.starts_with("event:")
        || line.starts_with("id:")
        || line.starts_with("retry:")
    {
        return Line::Field;
    }
    Line::Other
}

/// Turn a successful streaming response into a [`CodeStream`].
///
/// `extract` is called once per `data:` payload. The response body is owned by
/// the generator and dropped on every exit path, including early termination
/// by the consumer. A body that carried content but no `data:` lines at all is
/// reported as a provider error rather than an empty success.
pub fn decode_events<F>(provider: ProviderId, response: Response, mut extract: F) -> CodeStream
where
    F: FnMut(&str) -> SseStep + Send + 'static,
{
    let stream = try_stream! {
        let mut body = response.bytes_stream();
        let mut saw_data = false;
        let mut saw_other = false;

        while let Some(read) = body.next().await {
            let read = read.map_err(|e| {
                GatewayError::network(provider, format!("Stream read failed: {}", e.without_url()))
            })?;
            let text = String::from_utf8_lossy(&read);

            for line in text.split('\n') {
                match classify_line(line) {
                    Line::Data(data) => {
                        saw_data = true;
                        match extract(data) {
                            SseStep::Emit(fragment) => {
                                yield Bytes::from(fragment);
                            }
                            SseStep::Skip => {}
                            SseStep::Done => return,
                        }
                    }
                    Line::Other => saw_other = true,
                    Line::Field | Line::Blank => {}
                }
            }
        }

        if !saw_data && saw_other {
            Err::<(), _>(GatewayError::provider(
                provider,
                "response was not an event stream",
                None,
            ))?;
        }
    };

    Box::pin(stream)
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Extractor for chat-completions style streams (OpenAI, DeepSeek, Grok).
///
/// `[DONE]` ends the stream; `choices[0].delta.content` is forwarded when
/// non-empty; malformed payloads are logged and skipped.
pub fn chat_completion_delta(provider: ProviderId, data: &str) -> SseStep {
    if data == "[DONE]" {
        return SseStep::Done;
    }

    match serde_json::from_str::<ChatCompletionChunk>(data) {
        Ok(chunk) => chunk
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content)
            .filter(|content| !content.is_empty())
            .map_or(SseStep::Skip, SseStep::Emit),
        Err(e) => {
            warn!(provider = %provider, error = %e, "Skipping malformed stream event");
            SseStep::Skip
        }
    }
}

/// Extractor for the Anthropic messages stream.
///
/// Text arrives in `content_block_delta` events and, occasionally, inline in
/// `content_block_start`. Every other event type and any unparseable payload
/// is skipped without a warning.
pub fn anthropic_delta(data: &str) -> SseStep {
    if data == "[DONE]" {
        return SseStep::Skip;
    }

    let event: serde_json::Value = match serde_json::from_str(data) {
        Ok(value) => value,
        Err(e) => {
            trace!(error = %e, "Ignoring non-JSON Anthropic payload");
            return SseStep::Skip;
        }
    };

    let text = match event.get("type").and_then(serde_json::Value::as_str) {
        Some("content_block_delta") => event.pointer("/delta/text"),
        Some("content_block_start") => event
            .pointer("/content/text")
            .or_else(|| event.pointer("/content_block/text")),
        _ => None,
    };

    text.and_then(serde_json::Value::as_str)
        .filter(|text| !text.is_empty())
        .map_or(SseStep::Skip, |text| SseStep::Emit(text.to_string()))
}
