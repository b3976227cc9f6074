//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `irhub.toml` in the working directory, or the file named by
//! `IRHUB_CONFIG`. Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use std::time::Duration;

use serde::Deserialize;

use irhub_adapter_gc_dispatcher::DispatcherConfig;
use irhub_adapter_telnet::TelnetConfig;
use irhub_app::pool::PoolSettings;
use irhub_app::retry::RetryPolicy;
use irhub_domain::inventory::{DeviceBlock, Inventory};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Hub connection and pool.
    pub hub: HubConfig,
    /// Resend policy for hub commands.
    pub retry: RetryConfig,
    /// Dispatch service for Global Caché devices.
    pub dispatcher: DispatcherConfig,
    /// Device blocks, expanded into the inventory.
    pub devices: Vec<DeviceBlock>,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Disable to run with dispatcher devices only.
    pub enabled: bool,
    /// Concurrent hub sessions.
    pub pool_size: usize,
    /// How long a command waits for a free session, in milliseconds.
    pub pool_wait_ms: u64,
    #[serde(flatten)]
    pub telnet: TelnetConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub backoff_ms: u64,
}

impl Config {
    /// Load configuration from `irhub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if
    /// the result fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("IRHUB_CONFIG").unwrap_or_else(|_| "irhub.toml".to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("IRHUB_HOST") {
            self.server.host = val;
        }
        if let Some(port) = var("IRHUB_PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = var("IRHUB_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Some(val) = var("IRHUB_HUB_HOST") {
            self.hub.telnet.host = val;
        }
        if let Some(port) = var("IRHUB_HUB_PORT").and_then(|v| v.parse().ok()) {
            self.hub.telnet.port = port;
        }
        if let Some(size) = var("IRHUB_POOL_SIZE").and_then(|v| v.parse().ok()) {
            self.hub.pool_size = size;
        }
        if let Some(ms) = var("IRHUB_READ_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.hub.telnet.read_timeout_ms = ms;
        }
        if let Some(val) = var("IRHUB_DISPATCHER_API_BASE") {
            self.dispatcher.api_base = val;
        }
        if let Some(val) = var("IRHUB_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.hub.pool_size == 0 {
            return Err(ConfigError::Validation(
                "hub pool size must be at least 1".to_string(),
            ));
        }
        if self.hub.enabled && self.hub.telnet.port == 0 {
            return Err(ConfigError::Validation(
                "hub port must be non-zero".to_string(),
            ));
        }
        for block in &self.devices {
            if block.count == 0 || block.max_ports == 0 {
                return Err(ConfigError::Validation(format!(
                    "device block {} needs count and max_ports of at least 1",
                    block.host
                )));
            }
        }
        self.inventory().map(|_| ())
    }

    /// Expand the device blocks.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] when a block cannot be expanded.
    pub fn inventory(&self) -> Result<Inventory, ConfigError> {
        Inventory::expand(&self.devices).map_err(|err| ConfigError::Validation(err.to_string()))
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl HubConfig {
    #[must_use]
    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            size: self.pool_size,
            wait: Duration::from_millis(self.pool_wait_ms),
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            backoff: Duration::from_millis(self.backoff_ms),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "irhubd=info,irhub=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            pool_size: 1,
            pool_wait_ms: 2_000,
            telnet: TelnetConfig::default(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff_ms: 500,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
