//! Device identity and addressing.
//!
//! A [`DeviceInfo`] is the immutable description of one IR blaster: what kind
//! of hardware it is, where it lives on the network, and the key under which
//! it is cached. The runtime side (ports, serialization, transports) lives in
//! the `app` crate.

use serde::Serialize;

use crate::error::{ConfigurationError, IrHubError, InvalidArgumentError};
use crate::hardware::HardwareKind;
use crate::id::DeviceId;

/// Name the hub gives a RedRat3 that was never named.
pub const DEFAULT_REDRAT3_NAME: &str = "No name 9130";

/// Static description of one configured IR blaster.
///
/// Equality is by [`DeviceId`] only.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceInfo {
    id: DeviceId,
    kind: HardwareKind,
    host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

impl DeviceInfo {
    /// Describe a device.
    ///
    /// `name` is only meaningful for [`HardwareKind::RedRat3`], which the hub
    /// addresses by name; it is ignored for other kinds and when blank.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidHost`] when `host` is blank.
    pub fn new(
        kind: HardwareKind,
        host: impl Into<String>,
        name: Option<&str>,
    ) -> Result<Self, IrHubError> {
        let host = host.into().trim().to_string();
        if host.is_empty() {
            return Err(ConfigurationError::InvalidHost { host }.into());
        }
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty() && kind == HardwareKind::RedRat3)
            .map(ToString::to_string);
        let id = DeviceId::new(name.as_deref().unwrap_or(&host));
        Ok(Self {
            id,
            kind,
            host,
            name,
        })
    }

    #[must_use]
    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    #[must_use]
    pub fn kind(&self) -> HardwareKind {
        self.kind
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name sent to the hub for name-addressed hardware.
    #[must_use]
    pub fn wire_name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_REDRAT3_NAME)
    }

    /// Module index for dispatcher kinds addressed by module.
    #[must_use]
    pub fn module(&self) -> Option<&str> {
        self.kind.uses_module().then_some(self.host.as_str())
    }

    #[must_use]
    pub fn port_count(&self) -> u16 {
        self.kind.port_count()
    }

    /// URI form, `<scheme>://<host>`.
    #[must_use]
    pub fn uri(&self) -> String {
        format!("{}://{}", self.kind.scheme(), self.host)
    }
}

impl PartialEq for DeviceInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DeviceInfo {}

/// Split a device URI such as `itach://10.0.0.6` into its kind and host.
///
/// # Errors
///
/// [`InvalidArgumentError::InvalidDeviceUri`] when there is no `://` or no
/// host, [`ConfigurationError::UnknownHardware`] for an unknown scheme.
pub fn parse_device_uri(uri: &str) -> Result<(HardwareKind, String), IrHubError> {
    let invalid = || InvalidArgumentError::InvalidDeviceUri {
        uri: uri.to_string(),
    };
    let (scheme, rest) = uri.trim().split_once("://").ok_or_else(invalid)?;
    let host = rest.trim_end_matches('/');
    if host.is_empty() {
        return Err(invalid().into());
    }
    let kind: HardwareKind = scheme.parse()?;
    Ok((kind, host.to_string()))
}
