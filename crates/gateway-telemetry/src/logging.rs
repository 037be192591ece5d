//! Logging setup.
//!
//! `RUST_LOG` wins over the configured level when it is set, so operators can
//! raise verbosity for a single module without touching configuration.

use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable, for terminals
    #[default]
    Pretty,
    /// One JSON object per line, for log shippers
    Json,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default level filter directive
    pub level: String,
    /// Output format
    pub format: LogFormat,
    /// Include the event target (module path)
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            with_target: true,
        }
    }
}

impl LoggingConfig {
    /// Create a configuration with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the level filter
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Set the output format
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Switch to JSON output when `json` is set
    #[must_use]
    pub fn with_json(self, json: bool) -> Self {
        self.with_format(if json { LogFormat::Json } else { LogFormat::Pretty })
    }

    /// Include or omit the event target
    #[must_use]
    pub fn with_target(mut self, with_target: bool) -> Self {
        self.with_target = with_target;
        self
    }

    /// Filter from `RUST_LOG`, falling back to the configured level
    ///
    /// # Errors
    /// Returns error if the configured level is not a valid directive
    pub fn filter(&self) -> Result<EnvFilter, LoggingError> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(&self.level)
                .map_err(|e| LoggingError::InvalidLevel(format!("{}: {e}", self.level))),
        }
    }
}

/// Install the global subscriber
///
/// # Errors
/// Returns error if the level is invalid or a subscriber is already installed
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = config.filter()?;

    let layer = match config.format {
        LogFormat::Pretty => fmt::layer()
            .with_target(config.with_target)
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(config.with_target)
            .with_filter(filter)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    info!(level = %config.level, format = ?config.format, "Logging initialized");
    Ok(())
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The level directive did not parse
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),
    /// A global subscriber was already installed
    #[error("Failed to initialize logging: {0}")]
    Init(String),
}
