//! # Gateway Core
//!
//! Core types, traits, and error handling for the code generation gateway.
//!
//! This crate provides the foundational types used throughout the gateway:
//! - Inbound request and prepared generation request types
//! - The provider capability trait and provider identifiers
//! - The error taxonomy

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod provider;
pub mod request;

// Re-export commonly used types
pub use error::{GatewayError, GatewayResult, RETRYABLE_STATUS_CODES};
pub use provider::{CodeProvider, CodeStream, GenerateOptions, ProviderDescriptor, ProviderId};
pub use request::{ChatMessage, GenerateCodeRequest, GenerationRequest, MessageRole};
