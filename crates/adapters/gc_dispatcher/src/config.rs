//! Dispatch service configuration.

use std::time::Duration;

use serde::Deserialize;

/// Base URL and request timeout for the dispatch service.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Service root, e.g. `http://gc-dispatcher:8080/api`. Empty disables
    /// the dispatcher.
    pub api_base: String,
    /// Whole-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            timeout_ms: 10_000,
        }
    }
}

impl DispatcherConfig {
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.api_base.trim().is_empty()
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// `api_base` joined with `path`, without doubled slashes.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base.trim().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_have_sensible_defaults() {
        let config = DispatcherConfig::default();
        assert!(!config.is_enabled());
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn should_deserialize_from_toml() {
        let toml = r#"
            api_base = "http://gc-dispatcher:8080/"
            timeout_ms = 2500
        "#;
        let config: DispatcherConfig = toml::from_str(toml).unwrap();
        assert!(config.is_enabled());
        assert_eq!(config.timeout_ms, 2500);
        assert_eq!(config.url("/health"), "http://gc-dispatcher:8080/health");
    }

    #[test]
    fn should_use_defaults_for_missing_fields() {
        let config: DispatcherConfig = toml::from_str(r#"api_base = "http://gc""#).unwrap();
        assert_eq!(config.timeout_ms, 10_000);
        assert_eq!(config.url("press_key"), "http://gc/press_key");
    }
}
