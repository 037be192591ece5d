//! # Gateway Server
//!
//! HTTP server for the code generation gateway.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - The streaming `POST /api/generateCode` endpoint
//! - Health and model listing endpoints
//! - Prompt construction
//! - Graceful shutdown handling

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod prompt;
pub mod routes;
pub mod server;
pub mod shutdown;
pub mod state;

// Re-export main types
pub use error::ApiError;
pub use prompt::build_prompt;
pub use routes::create_router;
pub use server::Server;
pub use shutdown::shutdown_signal;
pub use state::AppState;
