//! Configured device inventory and slot resolution.
//!
//! Devices are configured in blocks: a starting host plus a count. Expanding
//! the blocks gives a flat, 1-based list of devices. A slot is a 1-based
//! position across every device's ports, in inventory order.

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::hardware::HardwareKind;

/// Ports assumed per device when a block does not say.
pub const DEFAULT_MAX_PORTS: u16 = 16;

/// One `[[devices]]` block of the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceBlock {
    #[serde(rename = "type", default = "default_kind")]
    pub kind: HardwareKind,
    /// First host of the block.
    pub host: String,
    /// Hub-side name, only used by RedRat3 units.
    #[serde(default)]
    pub name: Option<String>,
    /// Network port of the device, informational.
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default = "default_max_ports")]
    pub max_ports: u16,
}

fn default_kind() -> HardwareKind {
    HardwareKind::IrNetBoxPro3
}

fn default_count() -> u32 {
    1
}

fn default_max_ports() -> u16 {
    DEFAULT_MAX_PORTS
}

/// One device after block expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryEntry {
    /// 1-based device number.
    pub number: usize,
    #[serde(rename = "type")]
    pub kind: HardwareKind,
    pub host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    pub max_ports: u16,
}

impl InventoryEntry {
    /// Check a 1-based port against this entry's port count.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::PortOutOfRange`] outside `1..=max_ports`.
    pub fn check_port(&self, port: u16) -> Result<(), ConfigurationError> {
        if (1..=self.max_ports).contains(&port) {
            Ok(())
        } else {
            Err(ConfigurationError::PortOutOfRange {
                port,
                ports: self.max_ports,
            })
        }
    }
}

/// The flat device list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Inventory {
    entries: Vec<InventoryEntry>,
}

impl Inventory {
    /// Expand configured blocks, one entry per device.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidHost`] when a block with
    /// `count > 1` does not start at a dotted IPv4 address.
    pub fn expand(blocks: &[DeviceBlock]) -> Result<Self, ConfigurationError> {
        let mut entries = Vec::new();
        for block in blocks {
            let mut host = block.host.clone();
            for i in 0..block.count {
                if i > 0 {
                    host = next_host(&host)?;
                }
                entries.push(InventoryEntry {
                    number: entries.len() + 1,
                    kind: block.kind,
                    host: host.clone(),
                    name: block.name.clone(),
                    port: block.port,
                    max_ports: block.max_ports,
                });
            }
        }
        Ok(Self { entries })
    }

    #[must_use]
    pub fn entries(&self) -> &[InventoryEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of slots across every device.
    #[must_use]
    pub fn slot_count(&self) -> u32 {
        self.entries.iter().map(|e| u32::from(e.max_ports)).sum()
    }

    /// Whether any configured device's kind matches `predicate`.
    #[must_use]
    pub fn has_kind(&self, predicate: impl Fn(HardwareKind) -> bool) -> bool {
        self.entries.iter().any(|e| predicate(e.kind))
    }

    /// Look up a device by its 1-based number.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::DeviceOutOfRange`] for unknown numbers.
    pub fn device(&self, number: usize) -> Result<&InventoryEntry, ConfigurationError> {
        number
            .checked_sub(1)
            .and_then(|index| self.entries.get(index))
            .ok_or(ConfigurationError::DeviceOutOfRange {
                device: number,
                devices: self.entries.len(),
            })
    }

    /// Resolve a (device, port) pair, both 1-based.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::DeviceOutOfRange`] or
    /// [`ConfigurationError::PortOutOfRange`].
    pub fn locate(
        &self,
        device: usize,
        port: u16,
    ) -> Result<&InventoryEntry, ConfigurationError> {
        let entry = self.device(device)?;
        entry.check_port(port)?;
        Ok(entry)
    }

    /// Resolve a 1-based slot to a device and a port on it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::SlotOutOfRange`] past the last slot.
    pub fn locate_slot(&self, slot: u32) -> Result<(&InventoryEntry, u16), ConfigurationError> {
        let out_of_range = ConfigurationError::SlotOutOfRange {
            slot,
            slots: self.slot_count(),
        };
        if slot == 0 {
            return Err(out_of_range);
        }
        let mut offset = slot;
        for entry in &self.entries {
            let ports = u32::from(entry.max_ports);
            if offset <= ports {
                let port = u16::try_from(offset).map_err(|_| out_of_range.clone())?;
                return Ok((entry, port));
            }
            offset -= ports;
        }
        Err(out_of_range)
    }
}

/// The host after `host` in a block: the last octet is incremented, rolling
/// over past 254 to 0 with a carry into the octet before it.
///
/// # Errors
///
/// Returns [`ConfigurationError::InvalidHost`] if an octet is not a number.
pub fn next_host(host: &str) -> Result<String, ConfigurationError> {
    let bare = host.trim().trim_start_matches("http://");
    let mut octets = bare
        .split('.')
        .map(|octet| octet.parse::<u16>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| ConfigurationError::InvalidHost {
            host: host.to_string(),
        })?;
    for octet in octets.iter_mut().rev() {
        if octet.saturating_add(1) < 255 {
            *octet += 1;
            break;
        }
        *octet = 0;
    }
    Ok(octets
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("."))
}
