//! # Gateway Routing
//!
//! Request orchestration for the code generation gateway.
//!
//! [`GatewayContext`] ties the pieces together for one generation:
//! - Model resolution through the provider registry
//! - Per-provider rate limiting, one token per attempt
//! - Retry of stream establishment
//! - The end-to-end request deadline

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod context;

// Re-export main types
pub use context::{GatewayContext, GatewayContextBuilder, DEFAULT_REQUEST_TIMEOUT};
