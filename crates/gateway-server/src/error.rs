//! API error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gateway_core::GatewayError;
use serde_json::json;
use tracing::error;

/// An error rendered as `{"error": {"message", "type"}}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    error_type: &'static str,
}

impl ApiError {
    /// Create an error with an explicit status
    pub fn new(status: StatusCode, message: impl Into<String>, error_type: &'static str) -> Self {
        Self {
            status,
            message: message.into(),
            error_type,
        }
    }

    /// HTTP status of the response
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Message shown to the caller
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        let status = if !err.is_client_error() {
            StatusCode::INTERNAL_SERVER_ERROR
        } else if matches!(err, GatewayError::MissingCredential { .. }) {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::UNPROCESSABLE_ENTITY
        };

        let message = if err.is_backend() {
            format!("API Error: {err}. Please try again.")
        } else {
            err.to_string()
        };

        Self::new(status, message, err.kind())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error_type = self.error_type, message = %self.message, "Request failed");
        }

        let body = json!({
            "error": {
                "message": self.message,
                "type": self.error_type,
            }
        });
        (self.status, Json(body)).into_response()
    }
}
