//! reqwest-backed [`Dispatcher`].

use reqwest::Client;

use irhub_app::ports::Dispatcher;
use irhub_domain::error::IrHubError;
use irhub_domain::health::DispatcherHealth;

use crate::config::DispatcherConfig;
use crate::error::DispatcherError;

#[derive(Debug, Clone)]
pub struct GcDispatcher {
    client: Client,
    config: DispatcherConfig,
}

impl GcDispatcher {
    /// Build a client with the configured request timeout.
    ///
    /// Idle connections are not kept: every key press opens its own
    /// connection and closes it once the body is read.
    ///
    /// # Errors
    ///
    /// Returns [`DispatcherError::Request`] if the TLS backend cannot be
    /// initialised.
    pub fn new(config: DispatcherConfig) -> Result<Self, DispatcherError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .pool_max_idle_per_host(0)
            .build()?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    async fn post_press_key(&self, query: &str) -> Result<String, DispatcherError> {
        let url = format!("{}?{query}", self.config.url("press_key"));
        let response = self.client.post(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(%url, status = status.as_u16(), %body, "dispatcher replied");
        Ok(body)
    }

    async fn get_health(&self) -> Result<DispatcherHealth, DispatcherError> {
        let response = self.client.get(self.config.url("health")).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DispatcherError::Status {
                status: status.as_u16(),
            });
        }
        Ok(response.json().await?)
    }
}

impl Dispatcher for GcDispatcher {
    /// The body is returned whatever the status; the caller decides success
    /// from its content.
    async fn press_key(&self, query: &str) -> Result<String, IrHubError> {
        self.post_press_key(query).await.map_err(DispatcherError::into_domain)
    }

    async fn health(&self) -> Result<DispatcherHealth, IrHubError> {
        self.get_health().await.map_err(DispatcherError::into_domain)
    }
}
