//! Health probe: polls the hub's status queries and parses the replies.

use irhub_domain::error::IrHubError;
use irhub_domain::health::{self, HubHealth};
use irhub_domain::hub_query::HubQuery;
use irhub_domain::time;

use crate::pool::{ConnectionPool, PooledConnection};
use crate::ports::ConnectionFactory;
use crate::retry::{RetryPolicy, send_with_retry};

/// Queries the hub for its version, keysets and attached devices.
///
/// `process` takes `&mut self`; share a probe behind a mutex.
pub struct HealthProbe<F: ConnectionFactory> {
    pool: ConnectionPool<F>,
    retry: RetryPolicy,
    last: HubHealth,
}

impl<F: ConnectionFactory> HealthProbe<F> {
    pub fn new(pool: ConnectionPool<F>, retry: RetryPolicy) -> Self {
        Self {
            pool,
            retry,
            last: HubHealth::default(),
        }
    }

    #[must_use]
    pub fn pool(&self) -> &ConnectionPool<F> {
        &self.pool
    }

    /// Result of the most recent [`process`](Self::process).
    #[must_use]
    pub fn last(&self) -> &HubHealth {
        &self.last
    }

    /// Run every status query and return the fresh snapshot.
    ///
    /// Never fails: an unreachable hub or a failed hub-level query yields
    /// `hub_up == false`. Per-device queries only run for connected devices;
    /// a failure there leaves that field empty.
    #[tracing::instrument(skip(self), fields(endpoint = %self.pool.endpoint()))]
    pub async fn process(&mut self) -> HubHealth {
        let mut snapshot = HubHealth {
            checked_at: Some(time::now()),
            ..HubHealth::default()
        };

        match self.pool.get_connection().await {
            None => tracing::warn!("no hub connection available for health probe"),
            Some(mut conn) => {
                match self.query_hub(&mut conn, &mut snapshot).await {
                    Ok(()) => {
                        snapshot.hub_up = true;
                        self.query_devices(&mut conn, &mut snapshot).await;
                    }
                    Err(err) => tracing::warn!(error = %err, "hub health query failed"),
                }
                self.pool.release_connection(conn);
            }
        }

        tracing::debug!(
            hub_up = snapshot.hub_up,
            devices = snapshot.devices.len(),
            "health probe finished"
        );
        self.last = snapshot.clone();
        snapshot
    }

    async fn ask(&self, conn: &mut PooledConnection<F>, query: &HubQuery) -> Result<String, IrHubError> {
        send_with_retry(&mut **conn, &query.command(), query.terminator(), self.retry).await
    }

    async fn query_hub(
        &self,
        conn: &mut PooledConnection<F>,
        snapshot: &mut HubHealth,
    ) -> Result<(), IrHubError> {
        let version = self.ask(conn, &HubQuery::HubVersion).await?;
        snapshot.hub_version = health::parse_hub_version(&version);

        let keysets = self.ask(conn, &HubQuery::ListKeysets).await?;
        snapshot.keysets = health::parse_keysets(&keysets);

        let devices = self.ask(conn, &HubQuery::ListRedRats).await?;
        snapshot.devices = health::parse_device_list(&devices);
        Ok(())
    }

    async fn query_devices(&self, conn: &mut PooledConnection<F>, snapshot: &mut HubHealth) {
        for device in snapshot.devices.iter_mut().filter(|d| d.is_connected()) {
            let ip = device.ip.clone();
            device.firmware_version = self
                .ask_device(conn, &HubQuery::FirmwareVersion { ip: ip.clone() })
                .await;
            device.hardware_type = self.ask_device(conn, &HubQuery::HardwareType { ip }).await;
        }
    }

    async fn ask_device(&self, conn: &mut PooledConnection<F>, query: &HubQuery) -> Option<String> {
        match self.ask(conn, query).await {
            Ok(reply) => Some(reply.trim().to_string()),
            Err(err) => {
                tracing::debug!(query = %query, error = %err, "device query failed");
                None
            }
        }
    }
}
