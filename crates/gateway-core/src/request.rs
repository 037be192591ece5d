//! Request types for the gateway.
//!
//! [`GenerateCodeRequest`] is the inbound wire shape; [`GenerationRequest`] is
//! the immutable form the orchestrator works with once the prompt has been
//! assembled.

use crate::error::GatewayError;
use serde::{Deserialize, Serialize};

/// Role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// End-user message
    User,
    /// Prior model output
    Assistant,
}

/// Chat message as sent by the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author role
    pub role: MessageRole,
    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// Create a user message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Inbound code generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateCodeRequest {
    /// Target model (e.g. "gpt-4", "claude-3-opus-20240229")
    pub model: String,
    /// Conversation; only the first message's content is used
    pub messages: Vec<ChatMessage>,
}

impl GenerateCodeRequest {
    /// Create a single-message request
    #[must_use]
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage::user(prompt)],
        }
    }

    /// Parse and validate a JSON body.
    ///
    /// # Errors
    /// Returns a validation error describing the first problem found
    pub fn from_json(body: &[u8]) -> Result<Self, GatewayError> {
        let request: Self = serde_json::from_slice(body)
            .map_err(|e| GatewayError::validation(e.to_string()))?;
        request.validate()?;
        Ok(request)
    }

    /// Validate the request
    ///
    /// # Errors
    /// Returns error if the model is blank or there are no messages
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.model.trim().is_empty() {
            return Err(GatewayError::validation("model cannot be empty"));
        }
        if self.messages.is_empty() {
            return Err(GatewayError::validation("messages cannot be empty"));
        }
        Ok(())
    }

    /// Content of the first message
    #[must_use]
    pub fn first_content(&self) -> &str {
        self.messages.first().map_or("", |m| m.content.as_str())
    }
}

/// A prepared generation request. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    model_id: String,
    prompt_text: String,
}

impl GenerationRequest {
    /// Create a generation request
    #[must_use]
    pub fn new(model_id: impl Into<String>, prompt_text: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            prompt_text: prompt_text.into(),
        }
    }

    /// Requested model identifier
    #[must_use]
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Full prompt text sent to the backend
    #[must_use]
    pub fn prompt_text(&self) -> &str {
        &self.prompt_text
    }
}
