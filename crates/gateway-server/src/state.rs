//! Shared handler state.

use gateway_routing::GatewayContext;
use std::sync::Arc;

/// State handed to every request handler
#[derive(Debug, Clone)]
pub struct AppState {
    /// Registry, limiters and retry policies
    pub context: Arc<GatewayContext>,
}

impl AppState {
    /// Wrap a gateway context
    #[must_use]
    pub fn new(context: GatewayContext) -> Self {
        Self {
            context: Arc::new(context),
        }
    }
}

impl From<Arc<GatewayContext>> for AppState {
    fn from(context: Arc<GatewayContext>) -> Self {
        Self { context }
    }
}
