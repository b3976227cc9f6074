//! Device registry: one [`Device`] per configured blaster, created on first use.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use irhub_domain::device::{DeviceInfo, parse_device_uri};
use irhub_domain::error::{ConfigurationError, IrHubError};
use irhub_domain::hardware::{Family, HardwareKind};
use irhub_domain::hub_query::HubQuery;

use crate::pool::ConnectionPool;
use crate::ports::{ConnectionFactory, Dispatcher, HubConnection};
use crate::retry::RetryPolicy;
use crate::services::device::{Device, Link};

/// Creates and caches devices for the lifetime of the service.
///
/// Devices are keyed by name when they have one, by host otherwise. Lookups
/// take a shared lock; only the first resolution of a device writes.
pub struct DeviceRegistry<F: ConnectionFactory, D: Dispatcher> {
    hub: Option<ConnectionPool<F>>,
    dispatcher: Option<Arc<D>>,
    retry: RetryPolicy,
    devices: RwLock<HashMap<String, Arc<Device<F, D>>>>,
}

impl<F: ConnectionFactory, D: Dispatcher> DeviceRegistry<F, D> {
    /// Create an empty registry.
    ///
    /// `hub` serves irNetBox and RedRat3 devices, `dispatcher` the Global Caché
    /// family; either may be absent when no such devices are configured.
    pub fn new(hub: Option<ConnectionPool<F>>, dispatcher: Option<Arc<D>>, retry: RetryPolicy) -> Self {
        Self {
            hub,
            dispatcher,
            retry,
            devices: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn hub(&self) -> Option<&ConnectionPool<F>> {
        self.hub.as_ref()
    }

    #[must_use]
    pub fn dispatcher(&self) -> Option<&Arc<D>> {
        self.dispatcher.as_ref()
    }

    fn cached(&self, key: &str) -> Option<Arc<Device<F, D>>> {
        self.devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn link_for(&self, kind: HardwareKind) -> Result<Link<F, D>, ConfigurationError> {
        match kind.family() {
            Family::Hub => self
                .hub
                .clone()
                .map(Link::Hub)
                .ok_or(ConfigurationError::HubNotConfigured { kind }),
            Family::Dispatcher => self
                .dispatcher
                .clone()
                .map(Link::Dispatcher)
                .ok_or(ConfigurationError::DispatcherNotConfigured { kind }),
        }
    }

    /// Return the cached device for `name` or `host`, creating it if needed.
    ///
    /// A new irNetBox is registered with the hub once; a failure there is
    /// logged and the device is still returned.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when `host` is blank or the transport
    /// the hardware needs is not configured.
    #[tracing::instrument(skip(self))]
    pub async fn get_device(
        &self,
        kind: HardwareKind,
        host: &str,
        name: Option<&str>,
    ) -> Result<Arc<Device<F, D>>, IrHubError> {
        let name = name.map(str::trim).filter(|n| !n.is_empty());
        if let Some(device) = name.and_then(|n| self.cached(n)).or_else(|| self.cached(host.trim())) {
            return Ok(device);
        }

        let info = DeviceInfo::new(kind, host, name)?;
        let link = self.link_for(kind)?;
        let (device, created) = {
            let mut devices = self.devices.write().unwrap_or_else(PoisonError::into_inner);
            match devices.get(info.id().as_str()) {
                Some(existing) => (Arc::clone(existing), false),
                None => {
                    let device = Arc::new(Device::new(info, link, self.retry));
                    devices.insert(device.info().id().to_string(), Arc::clone(&device));
                    (device, true)
                }
            }
        };

        if created {
            tracing::info!(device = %device.info().id(), kind = %kind, "device created");
            if kind == HardwareKind::IrNetBoxPro3 {
                self.register_irnetbox(device.info().host()).await;
            }
        }
        Ok(device)
    }

    /// Resolve a `<scheme>://<host>` URI.
    ///
    /// # Errors
    ///
    /// See [`parse_device_uri`] and [`get_device`](Self::get_device).
    pub async fn resolve_uri(&self, uri: &str) -> Result<Arc<Device<F, D>>, IrHubError> {
        let (kind, host) = parse_device_uri(uri)?;
        self.get_device(kind, &host, None).await
    }

    /// Every device created so far, ordered by id.
    #[must_use]
    pub fn devices(&self) -> Vec<Arc<Device<F, D>>> {
        let mut devices: Vec<_> = self
            .devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        devices.sort_by(|a, b| a.info().id().cmp(b.info().id()));
        devices
    }

    async fn register_irnetbox(&self, ip: &str) {
        let Some(pool) = &self.hub else { return };
        let query = HubQuery::AddIrNetBox { ip: ip.to_string() };
        let Some(mut conn) = pool.get_connection().await else {
            tracing::warn!(ip, "no hub connection to register irNetBox");
            return;
        };
        match conn.send_command(&query.command(), query.terminator()).await {
            Ok(reply) => tracing::debug!(ip, reply = %reply, "irNetBox registered with hub"),
            Err(err) => tracing::warn!(ip, error = %err, "failed to register irNetBox with hub"),
        }
    }
}
