//! Custom Axum extractors for the gateway.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};
use std::convert::Infallible;

/// Request ID taken from the caller's headers, or generated
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get("x-request-id")
            .or_else(|| parts.headers.get("x-correlation-id"))
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map_or_else(|| uuid::Uuid::new_v4().to_string(), String::from);

        Ok(Self(id))
    }
}
