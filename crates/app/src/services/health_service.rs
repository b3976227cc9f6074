//! Health service: hub probe, dispatcher health and the aggregated status.

use std::sync::Arc;

use tokio::sync::Mutex;

use irhub_domain::command::Command;
use irhub_domain::hardware::HardwareKind;
use irhub_domain::health::{DispatcherHealth, HealthStatus, HubHealth, HubInput};
use irhub_domain::keypad::{WAKE_KEY, WAKE_KEYSET};

use crate::ports::{ConnectionFactory, Dispatcher};
use crate::retry::RetryPolicy;
use crate::services::device_registry::DeviceRegistry;
use crate::services::health_probe::HealthProbe;

pub struct HealthService<F: ConnectionFactory, D: Dispatcher> {
    probe: Option<Mutex<HealthProbe<F>>>,
    registry: Arc<DeviceRegistry<F, D>>,
    version: String,
}

impl<F: ConnectionFactory, D: Dispatcher> HealthService<F, D> {
    /// Probe the registry's hub pool, if it has one, and report `version`
    /// as the service version.
    pub fn new(registry: Arc<DeviceRegistry<F, D>>, retry: RetryPolicy, version: impl Into<String>) -> Self {
        let probe = registry
            .hub()
            .map(|pool| Mutex::new(HealthProbe::new(pool.clone(), retry)));
        Self {
            probe,
            registry,
            version: version.into(),
        }
    }

    /// Aggregate hub and dispatcher health.
    ///
    /// Devices the hub lists as not connected get a wake-up key press first;
    /// the hub is probed again when any of them answered.
    #[tracing::instrument(skip(self))]
    pub async fn status(&self) -> HealthStatus {
        let hub = match &self.probe {
            Some(probe) => {
                let mut probe = probe.lock().await;
                let mut health = probe.process().await;
                if self.wake_disconnected(&health).await {
                    health = probe.process().await;
                }
                Some((health, probe.pool().stats()))
            }
            None => None,
        };

        let dispatcher = match self.registry.dispatcher() {
            Some(dispatcher) => Some(dispatcher.health().await.unwrap_or_else(|err| {
                tracing::warn!(error = %err, "dispatcher health check failed");
                DispatcherHealth::default()
            })),
            None => None,
        };

        let status = HealthStatus::aggregate(
            &self.version,
            hub.as_ref().map(|(health, stats)| HubInput {
                health,
                pool: Some(stats),
            }),
            dispatcher.as_ref(),
        );
        tracing::info!(is_healthy = status.is_healthy, "health status computed");
        status
    }

    /// Rebuild the hub pool and probe it again. `None` without a hub.
    #[tracing::instrument(skip(self))]
    pub async fn restart(&self) -> Option<HubHealth> {
        let probe = self.probe.as_ref()?;
        let mut probe = probe.lock().await;
        probe.pool().restart();
        Some(probe.process().await)
    }

    async fn wake_disconnected(&self, health: &HubHealth) -> bool {
        let mut woken = false;
        // The hub wakes any unit through its irNetBox addressing, whatever
        // type it reports.
        for record in health.disconnected() {
            let result = match self
                .registry
                .get_device(HardwareKind::IrNetBoxPro3, &record.ip, None)
                .await
            {
                Ok(device) => match device.port(1) {
                    Some(port) => port.send(&Command::press(WAKE_KEY, WAKE_KEYSET)).await,
                    None => continue,
                },
                Err(err) => Err(err),
            };
            match result {
                Ok(()) => {
                    tracing::info!(ip = %record.ip, "woke disconnected device");
                    woken = true;
                }
                Err(err) => tracing::warn!(ip = %record.ip, error = %err, "failed to wake device"),
            }
        }
        woken
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use irhub_domain::health::{DISPATCHER_ENTITY, HUB_ENTITY};

    use crate::pool::{ConnectionPool, PoolSettings};
    use crate::testing::{FakeDispatcher, FakeHub};

    const VERSION: &str = "RedRat Hub (3.12)";
    const KEYSETS: &str = "{\nSKYHD\n}";
    const ASLEEP: &str = "{\n[IRNetBoxPro3] (00-11-22-33-44-55) at 10.0.0.5 (disconnected)\n}";
    const AWAKE: &str = "{\n[IRNetBoxPro3] (00-11-22-33-44-55) at 10.0.0.5 (connected)\n}";

    fn hub_only(hub: &FakeHub) -> HealthService<FakeHub, FakeDispatcher> {
        let registry = DeviceRegistry::new(
            Some(ConnectionPool::new(hub.clone(), PoolSettings::default())),
            None,
            RetryPolicy::default(),
        );
        HealthService::new(Arc::new(registry), RetryPolicy::default(), "0.1.0")
    }

    #[tokio::test(start_paused = true)]
    async fn should_report_healthy_when_hub_and_devices_are_up() {
        let hub = FakeHub::default();
        hub.answer(r#"hubQuery="hub version""#, VERSION);
        hub.answer(r#"hubQuery="list datasets""#, KEYSETS);
        hub.answer(r#"hubQuery="list redrats""#, AWAKE);
        let service = hub_only(&hub);

        let status = service.status().await;

        assert!(status.is_healthy);
        assert_eq!(status.version["MS_VERSION"], "0.1.0");
        assert_eq!(status.hw_devices.len(), 1);
        assert_eq!(status.dependencies.len(), 1);
        assert_eq!(status.dependencies[0].entity, HUB_ENTITY);
    }

    #[tokio::test(start_paused = true)]
    async fn should_reprobe_when_disconnected_device_wakes_up() {
        let hub = FakeHub::default();
        for reply in [VERSION, KEYSETS, ASLEEP, "OK", "OK", VERSION, KEYSETS, AWAKE, "2.1", "IRNetBoxPro3"] {
            hub.reply(reply);
        }
        let service = hub_only(&hub);

        let status = service.status().await;

        assert!(status.is_healthy);
        let sent = hub.sent();
        assert_eq!(sent[3], r#"hubQuery="add irnetbox" ip="10.0.0.5""#);
        assert_eq!(
            sent[4],
            r#"ip="10.0.0.5" dataset="PC_REMOTE" signal="VOLUP" output="1""#
        );
        assert_eq!(sent.len(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn should_wake_redrat3_by_ip_through_irnetbox_addressing() {
        let hub = FakeHub::default();
        let asleep = "{\n[RedRat3] (00-11-22-33-44-66) at 10.0.0.2 (disconnected)\n}";
        for reply in [VERSION, KEYSETS, asleep, "OK", "Failed to find signal VOLUP"] {
            hub.reply(reply);
        }
        let service = hub_only(&hub);

        service.status().await;

        let sent = hub.sent();
        assert_eq!(sent[3], r#"hubQuery="add irnetbox" ip="10.0.0.2""#);
        assert_eq!(
            sent[4],
            r#"ip="10.0.0.2" dataset="PC_REMOTE" signal="VOLUP" output="1""#
        );
    }

    #[tokio::test(start_paused = true)]
    async fn should_not_reprobe_when_wake_up_fails() {
        let hub = FakeHub::default();
        for reply in [VERSION, KEYSETS, ASLEEP, "OK", "Failed to find signal VOLUP"] {
            hub.reply(reply);
        }
        let service = hub_only(&hub);

        let status = service.status().await;

        assert!(!status.is_healthy);
        assert_eq!(hub.sent().len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn should_report_unhealthy_dispatcher_when_health_call_fails() {
        let registry: DeviceRegistry<FakeHub, FakeDispatcher> = DeviceRegistry::new(
            None,
            Some(Arc::new(FakeDispatcher::default())),
            RetryPolicy::default(),
        );
        let service = HealthService::new(Arc::new(registry), RetryPolicy::default(), "0.1.0");

        let status = service.status().await;

        assert!(!status.is_healthy);
        assert_eq!(status.dependencies.len(), 1);
        assert_eq!(status.dependencies[0].entity, DISPATCHER_ENTITY);
        assert!(!status.dependencies[0].is_healthy);
    }

    #[tokio::test(start_paused = true)]
    async fn should_report_healthy_dispatcher_with_result() {
        let dispatcher = FakeDispatcher::default();
        dispatcher.health_with(
            serde_json::from_str(r#"{"result":{"devices":[],"irdb":{"dataset_loaded":true,"ir_devices":[]}}}"#)
                .unwrap(),
        );
        let registry: DeviceRegistry<FakeHub, FakeDispatcher> =
            DeviceRegistry::new(None, Some(Arc::new(dispatcher)), RetryPolicy::default());
        let service = HealthService::new(Arc::new(registry), RetryPolicy::default(), "0.1.0");

        assert!(service.status().await.is_healthy);
    }

    #[tokio::test(start_paused = true)]
    async fn should_reconnect_and_reprobe_on_restart() {
        let hub = FakeHub::default();
        let service = hub_only(&hub);
        service.status().await;

        let health = service.restart().await.unwrap();

        assert!(health.hub_up);
        assert_eq!(hub.connects(), 2);
    }

    #[tokio::test]
    async fn should_skip_restart_without_hub() {
        let registry: DeviceRegistry<FakeHub, FakeDispatcher> =
            DeviceRegistry::new(None, None, RetryPolicy::default());
        let service = HealthService::new(Arc::new(registry), RetryPolicy::default(), "0.1.0");

        assert!(service.restart().await.is_none());
        assert!(!service.status().await.is_healthy);
    }
}
