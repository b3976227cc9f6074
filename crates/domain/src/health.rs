//! Hub and dispatcher health.
//!
//! The hub answers status queries in free text; the parsers here turn those
//! replies into [`HubDeviceRecord`]s, a component/version map and a keyset
//! list. [`HealthStatus::aggregate`] folds hub and dispatcher health into one
//! report.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// Status string the hub uses for a reachable device.
pub const CONNECTED: &str = "connected";

/// Entity name of the hub dependency report.
pub const HUB_ENTITY: &str = "RedRatHub";

/// Entity name of the dispatcher dependency report.
pub const DISPATCHER_ENTITY: &str = "GC Dispatcher Service";

/// Key of the service version in [`HealthStatus::version`].
pub const SERVICE_VERSION_KEY: &str = "MS_VERSION";

static DEVICE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(?P<type>[^\]]+)\]\s+\((?P<mac>[^)]+)\)\s+at\s+(?P<ip>\S+)(?:\s+\((?P<status>[^)]*)\))?\s*$")
        .expect("device line pattern is valid")
});

/// One IR device as reported by the hub.
///
/// `firmware_version` and `hardware_type` are filled in by follow-up queries
/// and stay `None` when those were skipped or failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubDeviceRecord {
    #[serde(rename = "type")]
    pub device_type: String,
    pub mac: String,
    pub ip: String,
    pub status: String,
    pub firmware_version: Option<String>,
    pub hardware_type: Option<String>,
}

impl HubDeviceRecord {
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.status.eq_ignore_ascii_case(CONNECTED)
    }
}

/// Parse the reply to `list redrats`.
///
/// Brace lines and lines that do not look like a device are skipped. MAC
/// hyphens become colons; a missing status is the empty string. Records are
/// sorted by IP as plain strings, so `10.0.0.10` comes before `10.0.0.2`.
#[must_use]
pub fn parse_device_list(reply: &str) -> Vec<HubDeviceRecord> {
    let mut devices: Vec<HubDeviceRecord> = reply
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('{') && !line.starts_with('}'))
        .filter_map(|line| DEVICE_LINE.captures(line))
        .map(|caps| HubDeviceRecord {
            device_type: caps["type"].to_string(),
            mac: caps["mac"].replace('-', ":"),
            ip: caps["ip"].to_string(),
            status: caps
                .name("status")
                .map_or_else(String::new, |m| m.as_str().to_string()),
            firmware_version: None,
            hardware_type: None,
        })
        .collect();
    devices.sort_by(|a, b| a.ip.cmp(&b.ip));
    devices
}

/// Parse the reply to `hub version`: `"<component> (<version>), ..."`.
///
/// Components without a parenthesised version are skipped.
#[must_use]
pub fn parse_hub_version(reply: &str) -> BTreeMap<String, String> {
    reply
        .trim()
        .split(", ")
        .filter_map(|part| {
            let part = part.trim().strip_suffix(')')?;
            let (name, version) = part.rsplit_once(" (")?;
            Some((name.trim().to_string(), version.trim().to_string()))
        })
        .filter(|(name, _)| !name.is_empty())
        .collect()
}

/// Parse the reply to `list datasets`: a brace block, one keyset per line.
#[must_use]
pub fn parse_keysets(reply: &str) -> Vec<String> {
    let lines: Vec<&str> = reply.trim().split('\n').collect();
    if lines.len() <= 1 {
        return Vec::new();
    }
    lines[1..lines.len() - 1]
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Snapshot of the hub as seen by the last probe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HubHealth {
    pub hub_up: bool,
    pub hub_version: BTreeMap<String, String>,
    pub keysets: Vec<String>,
    pub devices: Vec<HubDeviceRecord>,
    pub checked_at: Option<Timestamp>,
}

impl HubHealth {
    /// Devices the hub knows about but cannot currently reach.
    pub fn disconnected(&self) -> impl Iterator<Item = &HubDeviceRecord> {
        self.devices.iter().filter(|d| !d.is_connected())
    }
}

/// Connection pool figures exposed with the hub report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub endpoint: String,
    pub size: usize,
    pub active: usize,
    pub borrowed: u64,
}

/// Body of the dispatcher's `GET /health`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatcherHealth {
    #[serde(default)]
    pub result: Option<DispatcherHealthData>,
}

impl DispatcherHealth {
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.result.is_some()
    }

    /// Devices listed in the result, if any.
    #[must_use]
    pub fn devices(&self) -> &[DispatcherDevice] {
        self.result.as_ref().map_or(&[], |r| r.devices.as_slice())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatcherHealthData {
    #[serde(default)]
    pub devices: Vec<DispatcherDevice>,
    #[serde(default)]
    pub irdb: Option<Irdb>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatcherDevice {
    pub host: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub active_connections: u32,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub modules: Vec<DispatcherModule>,
    #[serde(default)]
    pub health: DeviceAvailability,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatcherModule {
    pub module: u32,
    pub ports: u32,
    #[serde(rename = "type")]
    pub module_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceAvailability {
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Irdb {
    #[serde(default)]
    pub dataset_loaded: bool,
    #[serde(default)]
    pub ir_devices: Vec<String>,
}

/// Health of one hardware device or one dependency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    pub entity: String,
    pub is_healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    pub version: BTreeMap<String, String>,
    pub metadata: BTreeMap<String, String>,
}

impl HealthReport {
    fn for_hub_device(device: &HubDeviceRecord) -> Self {
        let mut report = Self {
            entity: device.device_type.clone(),
            is_healthy: device.is_connected(),
            host: Some(device.ip.clone()),
            ..Self::default()
        };
        if let Some(firmware) = &device.firmware_version {
            report.version.insert("firmware".into(), firmware.clone());
        }
        report.metadata.insert("mac".into(), device.mac.clone());
        if let Some(hardware) = &device.hardware_type {
            report.metadata.insert("hardwareType".into(), hardware.clone());
        }
        report
    }

    fn for_dispatcher_device(device: &DispatcherDevice, number: usize) -> Self {
        let mut report = Self {
            device_id: Some(number.to_string()),
            entity: format!("iTach{number}"),
            is_healthy: device.health.available,
            host: Some(device.host.clone()),
            ..Self::default()
        };
        if let Some(version) = &device.version {
            report.version.insert("firmware".into(), version.clone());
        }
        report.metadata.insert("port".into(), device.port.to_string());
        report.metadata.insert(
            "activeConnections".into(),
            device.active_connections.to_string(),
        );
        let modules: Vec<String> = device
            .modules
            .iter()
            .map(|m| format!("{}:{} ({} ports)", m.module, m.module_type, m.ports))
            .collect();
        report.metadata.insert("modules".into(), modules.join(", "));
        if !device.health.errors.is_empty() {
            let errors: Vec<String> = device.health.errors.iter().map(ToString::to_string).collect();
            report.metadata.insert("errors".into(), errors.join(", "));
        }
        report
    }

    fn for_hub(hub: &HubHealth, pool: Option<&PoolStats>) -> Self {
        let mut report = Self {
            entity: HUB_ENTITY.to_string(),
            is_healthy: hub.hub_up,
            version: hub.hub_version.clone(),
            ..Self::default()
        };
        if let Some(pool) = pool {
            report.host = Some(pool.endpoint.clone());
            report.metadata.insert("poolSize".into(), pool.size.to_string());
            report.metadata.insert("activeConnections".into(), pool.active.to_string());
            report.metadata.insert("totalBorrows".into(), pool.borrowed.to_string());
        }
        report.metadata.insert("keysets".into(), hub.keysets.len().to_string());
        if !hub.hub_up {
            report.remarks = Some("hub did not answer the health probe".to_string());
        }
        report
    }

    fn for_dispatcher(dispatcher: &DispatcherHealth) -> Self {
        let mut report = Self {
            entity: DISPATCHER_ENTITY.to_string(),
            is_healthy: dispatcher.is_healthy(),
            ..Self::default()
        };
        match &dispatcher.result {
            Some(DispatcherHealthData {
                irdb: Some(irdb), ..
            }) => {
                report
                    .metadata
                    .insert("irdbDatasetLoaded".into(), irdb.dataset_loaded.to_string());
                report
                    .metadata
                    .insert("irDataset".into(), irdb.ir_devices.join(", "));
            }
            Some(_) => {}
            None => {
                report.remarks =
                    Some("did not receive health status from the dispatcher".to_string());
            }
        }
        report
    }
}

/// Service-wide health, as served to callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub version: BTreeMap<String, String>,
    pub is_healthy: bool,
    pub hw_devices: Vec<HealthReport>,
    pub dependencies: Vec<HealthReport>,
}

/// Hub half of an aggregation.
#[derive(Debug, Clone, Copy)]
pub struct HubInput<'a> {
    pub health: &'a HubHealth,
    pub pool: Option<&'a PoolStats>,
}

impl HealthStatus {
    /// Fold hub and dispatcher health into one status.
    ///
    /// Healthy means every configured dependency is up and every device the
    /// hub lists is connected. With neither dependency configured the service
    /// reports unhealthy.
    #[must_use]
    pub fn aggregate(
        service_version: &str,
        hub: Option<HubInput<'_>>,
        dispatcher: Option<&DispatcherHealth>,
    ) -> Self {
        let mut status = Self {
            is_healthy: match (hub, dispatcher) {
                (None, None) => false,
                (hub, dispatcher) => {
                    hub.is_none_or(|h| h.health.hub_up)
                        && dispatcher.is_none_or(DispatcherHealth::is_healthy)
                }
            },
            ..Self::default()
        };
        status
            .version
            .insert(SERVICE_VERSION_KEY.to_string(), service_version.to_string());

        if let Some(hub) = hub {
            for device in &hub.health.devices {
                status.hw_devices.push(HealthReport::for_hub_device(device));
                if !device.is_connected() {
                    status.is_healthy = false;
                }
            }
            status
                .dependencies
                .push(HealthReport::for_hub(hub.health, hub.pool));
        }
        if let Some(dispatcher) = dispatcher {
            for (index, device) in dispatcher.devices().iter().enumerate() {
                status
                    .hw_devices
                    .push(HealthReport::for_dispatcher_device(device, index + 1));
            }
            status
                .dependencies
                .push(HealthReport::for_dispatcher(dispatcher));
        }
        status
    }
}
