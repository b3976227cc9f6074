//! Remote service: turns inventory coordinates into bound [`Remote`]s.

use std::sync::Arc;
use std::time::Duration;

use irhub_domain::error::IrHubError;
use irhub_domain::inventory::{Inventory, InventoryEntry};

use crate::ports::{ConnectionFactory, Dispatcher};
use crate::services::device::Device;
use crate::services::device_registry::DeviceRegistry;
use crate::services::remote::Remote;

/// Resolves `(device, port)` pairs and slots against the configured inventory.
pub struct RemoteService<F: ConnectionFactory, D: Dispatcher> {
    inventory: Inventory,
    registry: Arc<DeviceRegistry<F, D>>,
    read_timeout: Duration,
}

impl<F: ConnectionFactory, D: Dispatcher> RemoteService<F, D> {
    pub fn new(inventory: Inventory, registry: Arc<DeviceRegistry<F, D>>, read_timeout: Duration) -> Self {
        Self {
            inventory,
            registry,
            read_timeout,
        }
    }

    #[must_use]
    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<DeviceRegistry<F, D>> {
        &self.registry
    }

    async fn device_for(&self, entry: &InventoryEntry) -> Result<Arc<Device<F, D>>, IrHubError> {
        self.registry
            .get_device(entry.kind, &entry.host, entry.name.as_deref())
            .await
    }

    /// The device behind inventory entry `device` (1-based), checked to
    /// have output `port`.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError`](irhub_domain::error::ConfigurationError) for
    /// unknown devices or ports, whether the inventory or the hardware
    /// rules them out.
    pub async fn device_at(&self, device: usize, port: u16) -> Result<Arc<Device<F, D>>, IrHubError> {
        let entry = self.inventory.locate(device, port)?;
        let device = self.device_for(entry).await?;
        device.require_port(port)?;
        Ok(device)
    }

    /// Resolve device `device` (1-based) and its output `port`.
    ///
    /// # Errors
    ///
    /// As [`device_at`](Self::device_at), plus
    /// [`InvalidArgumentError::EmptyKeyset`](irhub_domain::error::InvalidArgumentError::EmptyKeyset)
    /// for a blank keyset.
    #[tracing::instrument(skip(self))]
    pub async fn remote_for_device(
        &self,
        device: usize,
        port: u16,
        keyset: &str,
    ) -> Result<Remote<F, D>, IrHubError> {
        let device = self.device_at(device, port).await?;
        Ok(Remote::new(device, port, keyset)?.with_read_timeout(self.read_timeout))
    }

    /// Resolve a 1-based slot across the whole inventory.
    ///
    /// # Errors
    ///
    /// As [`remote_for_device`](Self::remote_for_device), plus
    /// [`ConfigurationError::SlotOutOfRange`](irhub_domain::error::ConfigurationError::SlotOutOfRange).
    #[tracing::instrument(skip(self))]
    pub async fn remote_for_slot(&self, slot: u32, keyset: &str) -> Result<Remote<F, D>, IrHubError> {
        let (entry, port) = self.inventory.locate_slot(slot)?;
        let device = self.device_for(entry).await?;
        Ok(Remote::new(device, port, keyset)?.with_read_timeout(self.read_timeout))
    }

    /// Resolve a device by `<scheme>://<host>` URI, outside the inventory.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError`](irhub_domain::error::ConfigurationError) for a
    /// malformed URI, an unknown scheme or a port the hardware lacks.
    #[tracing::instrument(skip(self))]
    pub async fn remote_for_uri(
        &self,
        uri: &str,
        port: u16,
        keyset: &str,
    ) -> Result<Remote<F, D>, IrHubError> {
        let device = self.registry.resolve_uri(uri).await?;
        Ok(Remote::new(device, port, keyset)?.with_read_timeout(self.read_timeout))
    }
}
