//! Pool factory for hub sessions.

use std::sync::Arc;

use irhub_app::ports::ConnectionFactory;

use crate::config::TelnetConfig;
use crate::transport::TelnetTransport;

/// Builds unconnected [`TelnetTransport`]s sharing one configuration.
#[derive(Debug, Clone)]
pub struct TelnetConnector {
    config: Arc<TelnetConfig>,
}

impl TelnetConnector {
    #[must_use]
    pub fn new(config: TelnetConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    #[must_use]
    pub fn config(&self) -> &TelnetConfig {
        &self.config
    }
}

impl ConnectionFactory for TelnetConnector {
    type Connection = TelnetTransport;

    fn create(&self, instance_id: u64) -> TelnetTransport {
        TelnetTransport::new(Arc::clone(&self.config), instance_id)
    }

    fn endpoint(&self) -> String {
        self.config.address()
    }
}
