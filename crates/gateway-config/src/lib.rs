//! # Gateway Config
//!
//! Configuration for the code generation gateway.
//!
//! Configuration is layered:
//! 1. Built-in defaults
//! 2. An optional YAML or TOML file named by `GATEWAY_CONFIG`
//! 3. `GATEWAY_*` environment overrides
//!
//! The merged result is validated before it is handed to the rest of the
//! gateway. Provider credentials are deliberately absent; adapters read them
//! from the environment when they are first constructed.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use gateway_core::{GatewayError, GatewayResult, ProviderId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use validator::{Validate, ValidationError};

/// Environment variable naming the configuration file
pub const CONFIG_PATH_ENV: &str = "GATEWAY_CONFIG";

/// Longest accepted end-to-end request deadline
pub const MAX_REQUEST_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Root gateway configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_provider_tables"))]
pub struct GatewayConfig {
    /// HTTP listener settings
    #[validate(nested)]
    pub server: ServerConfig,

    /// End-to-end deadline for a single generation, streaming included
    #[serde(with = "humantime_serde")]
    #[validate(custom(function = "request_timeout_bounds"))]
    pub request_timeout: Duration,

    /// Retry policy for non-streaming backend calls
    #[validate(nested)]
    pub retry: RetrySettings,

    /// Attempt limit for stream establishment
    #[validate(range(min = 1))]
    pub stream_retry_attempts: u32,

    /// Per-provider quota overrides
    pub rate_limits: HashMap<ProviderId, RateLimitSettings>,

    /// Per-provider endpoint overrides
    pub providers: HashMap<ProviderId, ProviderEndpointConfig>,

    /// Logging settings
    #[validate(nested)]
    pub logging: LoggingSettings,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            request_timeout: Duration::from_secs(300),
            retry: RetrySettings::default(),
            stream_retry_attempts: 2,
            rate_limits: HashMap::new(),
            providers: HashMap::new(),
            logging: LoggingSettings::default(),
        }
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    #[validate(length(min = 1))]
    pub host: String,
    /// Bind port
    #[validate(range(min = 1))]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    /// `host:port` socket address string
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Retry settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RetrySettings {
    /// Total attempts, including the first
    #[validate(range(min = 1))]
    pub max_attempts: u32,
    /// Delay before the first retry
    #[serde(with = "humantime_serde")]
    pub initial_delay: Duration,
    /// Upper bound on any single delay
    #[serde(with = "humantime_serde")]
    pub max_delay: Duration,
    /// Multiplier applied after each retry
    #[validate(range(min = 1.0))]
    pub backoff_factor: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10_000),
            backoff_factor: 2.0,
        }
    }
}

/// Token bucket quota for one provider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateLimitSettings {
    /// Tokens replenished per interval
    pub tokens_per_interval: f64,
    /// Replenishment interval
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    /// Bucket capacity; defaults to `tokens_per_interval`
    #[serde(default)]
    pub burst_limit: Option<f64>,
}

/// Endpoint override for one provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpointConfig {
    /// Base URL replacing the provider's public endpoint
    #[serde(default)]
    pub base_url: Option<String>,
    /// HTTP client timeout for this provider
    #[serde(default = "default_provider_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for ProviderEndpointConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: default_provider_timeout(),
        }
    }
}

fn default_provider_timeout() -> Duration {
    Duration::from_secs(300)
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default level filter; `RUST_LOG` takes precedence when set
    #[validate(length(min = 1))]
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

fn request_timeout_bounds(value: &Duration) -> Result<(), ValidationError> {
    if value.is_zero() {
        return Err(ValidationError::new("non_zero_duration"));
    }
    if *value > MAX_REQUEST_TIMEOUT {
        return Err(ValidationError::new("request_timeout_too_long")
            .with_message("request_timeout must not exceed 24h".into()));
    }
    Ok(())
}

fn validate_provider_tables(config: &GatewayConfig) -> Result<(), ValidationError> {
    if config.retry.initial_delay > config.retry.max_delay {
        return Err(ValidationError::new("retry_delay_order")
            .with_message("retry.initial_delay must not exceed retry.max_delay".into()));
    }

    for (provider, limit) in &config.rate_limits {
        let positive_rate = limit.tokens_per_interval.is_finite() && limit.tokens_per_interval > 0.0;
        let positive_burst = limit.burst_limit.map_or(true, |b| b.is_finite() && b >= 1.0);
        if !positive_rate || !positive_burst || limit.interval.is_zero() {
            let mut error = ValidationError::new("rate_limit");
            error.add_param("provider".into(), &provider.as_str());
            return Err(error.with_message(
                format!("invalid rate limit for provider {provider}").into(),
            ));
        }
    }

    for (provider, endpoint) in &config.providers {
        let blank_url = endpoint
            .base_url
            .as_deref()
            .is_some_and(|url| url.trim().is_empty());
        if blank_url || endpoint.timeout.is_zero() {
            return Err(ValidationError::new("provider_endpoint").with_message(
                format!("invalid endpoint override for provider {provider}").into(),
            ));
        }
    }

    Ok(())
}

impl GatewayConfig {
    /// Parse configuration text in the given format
    ///
    /// # Errors
    /// Returns a configuration error if the text does not parse
    pub fn parse(content: &str, format: ConfigFormat) -> GatewayResult<Self> {
        match format {
            ConfigFormat::Yaml => serde_yaml::from_str(content)
                .map_err(|e| GatewayError::configuration(format!("Invalid YAML config: {e}"))),
            ConfigFormat::Toml => toml::from_str(content)
                .map_err(|e| GatewayError::configuration(format!("Invalid TOML config: {e}"))),
        }
    }

    /// Read and parse a configuration file; the format follows the extension
    ///
    /// # Errors
    /// Returns a configuration error if the file cannot be read or parsed
    pub async fn from_file(path: impl AsRef<Path>) -> GatewayResult<Self> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            GatewayError::configuration(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        debug!(path = %path.display(), ?format, "Parsing configuration file");
        Self::parse(&content, format)
    }

    /// Apply `GATEWAY_*` overrides from `lookup`
    ///
    /// # Errors
    /// Returns a configuration error if an override has an invalid value
    pub fn apply_overrides<F>(&mut self, lookup: F) -> GatewayResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("GATEWAY_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("GATEWAY_PORT") {
            self.server.port = parse_override("GATEWAY_PORT", &port)?;
        }
        if let Some(level) = lookup("GATEWAY_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = lookup("GATEWAY_LOG_JSON") {
            self.logging.json = parse_override("GATEWAY_LOG_JSON", &json)?;
        }
        if let Some(secs) = lookup("GATEWAY_REQUEST_TIMEOUT_SECS") {
            self.request_timeout =
                Duration::from_secs(parse_override("GATEWAY_REQUEST_TIMEOUT_SECS", &secs)?);
        }
        Ok(())
    }

    /// Run validation rules
    ///
    /// # Errors
    /// Returns a configuration error describing every failed rule
    pub fn check(&self) -> GatewayResult<()> {
        self.validate()
            .map_err(|e| GatewayError::configuration(format!("Invalid configuration: {e}")))
    }

    /// Endpoint override for a provider, if any
    #[must_use]
    pub fn provider_endpoint(&self, provider: ProviderId) -> Option<&ProviderEndpointConfig> {
        self.providers.get(&provider)
    }
}

fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> GatewayResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| GatewayError::configuration(format!("Invalid value for {name}: {value}")))
}

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML (`.yaml`, `.yml`)
    Yaml,
    /// TOML (`.toml`)
    Toml,
}

impl ConfigFormat {
    /// Detect the format from a file extension
    ///
    /// # Errors
    /// Returns a configuration error for unknown extensions
    pub fn from_path(path: &Path) -> GatewayResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some("toml") => Ok(Self::Toml),
            _ => Err(GatewayError::configuration(format!(
                "Unsupported config file format: {}",
                path.display()
            ))),
        }
    }
}

/// Load configuration from defaults, `GATEWAY_CONFIG` and the environment.
///
/// # Errors
/// Returns a configuration error if the file is unreadable, an override is
/// malformed, or the merged result fails validation
pub async fn load_config() -> GatewayResult<GatewayConfig> {
    let mut config = match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) if !path.trim().is_empty() => {
            info!(path = %path, "Loading configuration file");
            GatewayConfig::from_file(&path).await?
        }
        _ => GatewayConfig::default(),
    };

    config.apply_overrides(|name| std::env::var(name).ok())?;
    config.check()?;
    Ok(config)
}
