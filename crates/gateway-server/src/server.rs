//! HTTP listener.

use gateway_config::ServerConfig;
use gateway_core::GatewayError;
use std::future::Future;
use tokio::net::TcpListener;
use tracing::info;

use crate::{routes::create_router, shutdown::shutdown_signal, state::AppState};

/// The gateway HTTP server
#[derive(Debug)]
pub struct Server {
    config: ServerConfig,
    state: AppState,
}

impl Server {
    /// Create a server
    #[must_use]
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Serve until Ctrl-C or SIGTERM
    ///
    /// # Errors
    /// Returns error if the address cannot be bound or serving fails
    pub async fn run(self) -> Result<(), GatewayError> {
        self.run_until(async {
            shutdown_signal().await;
        })
        .await
    }

    /// Serve until `shutdown` resolves, letting in-flight streams finish
    ///
    /// # Errors
    /// Returns error if the address cannot be bound or serving fails
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let address = self.config.bind_address();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|e| GatewayError::configuration(format!("cannot bind {address}: {e}")))?;

        info!(address = %address, "Gateway listening");

        axum::serve(listener, create_router(self.state))
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| GatewayError::internal(format!("server error: {e}")))?;

        info!("Gateway stopped");
        Ok(())
    }
}
