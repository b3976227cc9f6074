//! Supported IR blaster hardware families.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// One of the six supported hardware kinds.
///
/// Each kind has a fixed number of IR outputs and is reached through one of
/// two [`Family`] transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum HardwareKind {
    /// Global Caché GC-100 (6 outputs), addressed by module.
    Gc100,
    /// Global Caché GC-100-12.
    Gc100_12,
    /// Global Caché GC-100-06.
    Gc100_6,
    /// Global Caché iTach IP2IR.
    Itach,
    /// RedRat irNetBox Pro III behind the hub.
    IrNetBoxPro3,
    /// Single-output USB RedRat3 behind the hub, addressed by name.
    RedRat3,
}

/// Transport family a hardware kind is reached through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    /// Pooled telnet sessions to the shared hub.
    Hub,
    /// One-shot HTTP calls to the dispatch service.
    Dispatcher,
}

impl HardwareKind {
    /// Every supported kind, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Gc100,
        Self::Gc100_12,
        Self::Gc100_6,
        Self::Itach,
        Self::IrNetBoxPro3,
        Self::RedRat3,
    ];

    /// Canonical lowercase name, also used as the device URI scheme.
    #[must_use]
    pub fn scheme(self) -> &'static str {
        match self {
            Self::Gc100 => "gc100",
            Self::Gc100_12 => "gc100-12",
            Self::Gc100_6 => "gc100-6",
            Self::Itach => "itach",
            Self::IrNetBoxPro3 => "irnetboxpro3",
            Self::RedRat3 => "redrat3",
        }
    }

    /// Number of IR outputs, numbered from 1.
    #[must_use]
    pub fn port_count(self) -> u16 {
        match self {
            Self::Gc100 | Self::Gc100_6 => 6,
            Self::Gc100_12 => 12,
            Self::Itach => 3,
            Self::IrNetBoxPro3 => 16,
            Self::RedRat3 => 1,
        }
    }

    #[must_use]
    pub fn family(self) -> Family {
        match self {
            Self::IrNetBoxPro3 | Self::RedRat3 => Family::Hub,
            Self::Gc100 | Self::Gc100_12 | Self::Gc100_6 | Self::Itach => Family::Dispatcher,
        }
    }

    /// Whether the dispatcher addresses this kind by module instead of host.
    #[must_use]
    pub fn uses_module(self) -> bool {
        matches!(self, Self::Gc100 | Self::Gc100_12 | Self::Gc100_6)
    }
}

impl fmt::Display for HardwareKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme())
    }
}

impl FromStr for HardwareKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        let kind = match normalized.as_str() {
            "gc100" => Self::Gc100,
            "gc100-12" => Self::Gc100_12,
            "gc100-6" | "gc100-06" => Self::Gc100_6,
            "itach" => Self::Itach,
            "irnetboxpro3" | "irnetboxpro" | "irnetbox" => Self::IrNetBoxPro3,
            "redrat3" | "redrat" => Self::RedRat3,
            _ => {
                return Err(ConfigurationError::UnknownHardware {
                    name: s.to_string(),
                });
            }
        };
        Ok(kind)
    }
}

impl TryFrom<String> for HardwareKind {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HardwareKind> for &'static str {
    fn from(kind: HardwareKind) -> Self {
        kind.scheme()
    }
}
