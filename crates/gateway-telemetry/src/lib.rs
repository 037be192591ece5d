//! # Gateway Telemetry
//!
//! Structured logging for the code generation gateway, built on
//! `tracing-subscriber` with an environment filter and optional JSON output.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod logging;

// Re-export main types
pub use logging::{init_logging, LogFormat, LoggingConfig, LoggingError};
