//! HTTP request handlers for the gateway API.

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use futures::TryStreamExt;
use gateway_core::{GenerateCodeRequest, GenerationRequest};
use serde::Serialize;
use tracing::{error, info, instrument};

use crate::{error::ApiError, extractors::RequestId, prompt::build_prompt, state::AppState};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: &'static str,
    /// Version
    pub version: &'static str,
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// A routable model
#[derive(Debug, Serialize)]
pub struct ModelObject {
    /// Model identifier accepted by `/api/generateCode`
    pub id: &'static str,
    /// Always "model"
    pub object: &'static str,
    /// Provider serving the model
    pub owned_by: &'static str,
}

/// Model listing
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    /// Always "list"
    pub object: &'static str,
    /// Routable models
    pub data: Vec<ModelObject>,
}

/// List routable models
pub async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    let data = state
        .context
        .registry()
        .models()
        .into_iter()
        .map(|(id, provider)| ModelObject {
            id,
            object: "model",
            owned_by: provider.as_str(),
        })
        .collect();

    Json(ModelsResponse {
        object: "list",
        data,
    })
}

/// Generate code as a plain-text stream.
///
/// The body is parsed by hand so that malformed input maps to 422 with the
/// parser's message rather than axum's JSON rejection.
#[instrument(skip_all, fields(request_id = %request_id.0, model = tracing::field::Empty))]
pub async fn generate_code(
    State(state): State<AppState>,
    request_id: RequestId,
    body: Bytes,
) -> Result<Response, ApiError> {
    let RequestId(request_id) = request_id;
    let request = GenerateCodeRequest::from_json(&body)?;
    tracing::Span::current().record("model", request.model.as_str());

    let generation = GenerationRequest::new(&request.model, build_prompt(request.first_content()));
    let stream = state.context.generate(&generation).await?;

    info!("Streaming generated code");

    let stream = stream.inspect_err(move |e| {
        error!(request_id = %request_id, error = %e, "Stream failed after response started");
    });

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(stream),
    )
        .into_response())
}
