//! Integration tests for the code generation gateway
//!
//! This crate exercises the full request path against mock backends:
//! - Each provider adapter's wire format
//! - Model routing through the gateway context
//! - Retry and rate limiting around backend calls
//! - Contexts built from configuration files
//! - The HTTP endpoint

pub mod helpers;
pub mod mock_providers;

// Re-export commonly used items
pub use helpers::*;
pub use mock_providers::*;

#[cfg(test)]
mod api_tests;
#[cfg(test)]
mod config_tests;
#[cfg(test)]
mod gateway_tests;
#[cfg(test)]
mod provider_tests;
#[cfg(test)]
mod rate_limit_tests;
