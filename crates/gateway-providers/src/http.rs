//! HTTP plumbing shared by every backend: client construction, request
//! dispatch and error classification.

use gateway_core::{GatewayError, ProviderId};
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;
use tracing::{debug, error};

/// Build the HTTP client for one adapter
pub(crate) fn build_client(provider: ProviderId, timeout: Duration) -> Result<Client, GatewayError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| {
            GatewayError::configuration(format!("Failed to create HTTP client for {provider}: {e}"))
        })
}

/// Send a request; non-success statuses become classified errors.
pub(crate) async fn send(
    provider: ProviderId,
    request: RequestBuilder,
) -> Result<Response, GatewayError> {
    // Google carries its key in the query string; keep URLs out of messages.
    let response = request.send().await.map_err(|e| {
        let e = e.without_url();
        error!(provider = %provider, error = %e, "Backend request failed");
        GatewayError::network(provider, format!("Request failed: {e}"))
    })?;

    let status = response.status();
    if status.is_success() {
        debug!(provider = %provider, status = %status, "Backend accepted stream request");
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs);
    let body = response.text().await.unwrap_or_default();

    Err(classify_error(provider, status.as_u16(), &body, retry_after))
}

/// Map a backend status and error body onto the error taxonomy
pub(crate) fn classify_error(
    provider: ProviderId,
    status: u16,
    body: &str,
    retry_after: Option<Duration>,
) -> GatewayError {
    let message = extract_error_message(body).unwrap_or_else(|| {
        let body = body.trim();
        if body.is_empty() {
            format!("HTTP {status}")
        } else {
            format!("HTTP {status}: {body}")
        }
    });

    match status {
        401 => GatewayError::authentication(provider, message),
        429 => GatewayError::rate_limit(provider, retry_after),
        _ => GatewayError::provider(provider, message, Some(status)),
    }
}

/// Pull a human readable message out of a JSON error body.
///
/// Accepts `{"error":{"message":..}}`, `{"error":".."}` and `{"message":..}`.
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .pointer("/error/message")
        .or_else(|| value.get("error").filter(|e| e.is_string()))
        .or_else(|| value.get("message"))
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
}
