//! # Codegen Gateway
//!
//! Streams React component code from one of several LLM backends.
//!
//! ## Usage
//!
//! ```bash
//! # Start with default configuration
//! codegen-gateway
//!
//! # Start with a config file
//! GATEWAY_CONFIG=/path/to/gateway.yaml codegen-gateway
//!
//! # Start with environment overrides
//! GATEWAY_PORT=9000 codegen-gateway
//! ```
//!
//! Provider credentials are read from `OPENAI_API_KEY`, `ANTHROPIC_API_KEY`,
//! `GOOGLE_AI_API_KEY`, `DEEPSEEK_API_KEY` and `GROK_API_KEY` when a model of
//! that provider is first requested.

use anyhow::Context;
use gateway_config::load_config;
use gateway_core::ProviderId;
use gateway_providers::CredentialSource;
use gateway_routing::GatewayContext;
use gateway_server::{AppState, Server};
use gateway_telemetry::{init_logging, LoggingConfig};
use tracing::{error, info, warn};

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, "Application failed");
        eprintln!("codegen-gateway: {e:#}");
        std::process::exit(1);
    }
}

/// Main application logic
async fn run() -> anyhow::Result<()> {
    let config = load_config().await.context("failed to load configuration")?;

    let logging = LoggingConfig::new()
        .with_level(config.logging.level.clone())
        .with_json(config.logging.json);
    init_logging(&logging).context("failed to initialize logging")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.server.host,
        port = config.server.port,
        request_timeout_secs = config.request_timeout.as_secs(),
        "Starting codegen gateway"
    );

    for provider in ProviderId::ALL {
        let var = provider.credential_env_var();
        if std::env::var(var).map_or(true, |value| value.is_empty()) {
            warn!(provider = %provider, env_var = var, "Credential not set; its models will be rejected");
        }
    }

    let context = GatewayContext::from_config(&config, CredentialSource::Environment);
    Server::new(config.server.clone(), AppState::new(context))
        .run()
        .await?;

    Ok(())
}
