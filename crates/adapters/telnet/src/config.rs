//! Hub connection configuration.

use std::time::Duration;

use serde::Deserialize;

/// Where the hub listens and how long to wait on it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelnetConfig {
    /// Hub hostname or IP address.
    pub host: String,
    /// Hub telnet port.
    pub port: u16,
    /// Maximum wait for each reply line, in milliseconds.
    pub read_timeout_ms: u64,
    /// Maximum wait for the TCP handshake, in milliseconds.
    pub connect_timeout_ms: u64,
}

impl Default for TelnetConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 40000,
            read_timeout_ms: 15_000,
            connect_timeout_ms: 15_000,
        }
    }
}

impl TelnetConfig {
    /// `host:port`, as passed to the socket.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}
