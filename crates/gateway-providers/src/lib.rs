//! # Gateway Providers
//!
//! Streaming code generation backends for the gateway.
//!
//! This crate provides:
//! - One adapter per backend: OpenAI, Anthropic, Google Gemini, DeepSeek and Grok
//! - Shared SSE decoding and HTTP error classification
//! - The DeepSeek import corrector
//! - The model catalog and the lazily populated adapter registry

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod http;

pub mod anthropic;
pub mod corrector;
pub mod deepseek;
pub mod google;
pub mod grok;
pub mod openai;
pub mod registry;
pub mod settings;
pub mod sse;

// Re-export main types
pub use anthropic::AnthropicProvider;
pub use corrector::ImportCorrector;
pub use deepseek::DeepSeekProvider;
pub use google::GoogleProvider;
pub use grok::GrokProvider;
pub use openai::OpenAIProvider;
pub use registry::{provider_for_model, EndpointOverride, ProviderRegistry, MODEL_CATALOG};
pub use settings::{CredentialSource, ProviderSettings};
