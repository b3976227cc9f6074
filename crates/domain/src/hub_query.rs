//! Status and management queries understood by the hub.

use std::fmt;

use crate::framing::Terminator;

/// One hub query, with the framing rule its reply needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubQuery {
    ListRedRats,
    HubVersion,
    ListKeysets,
    FirmwareVersion { ip: String },
    HardwareType { ip: String },
    /// Register an irNetBox with the hub.
    AddIrNetBox { ip: String },
}

impl HubQuery {
    /// Wire text, without line ending.
    #[must_use]
    pub fn command(&self) -> String {
        match self {
            Self::ListRedRats => r#"hubQuery="list redrats""#.to_string(),
            Self::HubVersion => r#"hubQuery="hub version""#.to_string(),
            Self::ListKeysets => r#"hubQuery="list datasets""#.to_string(),
            Self::FirmwareVersion { ip } => format!(r#"hardwareQuery="firmware version" ip="{ip}""#),
            Self::HardwareType { ip } => format!(r#"hardwareQuery="hardware type" ip="{ip}""#),
            Self::AddIrNetBox { ip } => format!(r#"hubQuery="add irnetbox" ip="{ip}""#),
        }
    }

    #[must_use]
    pub fn terminator(&self) -> Terminator {
        match self {
            Self::FirmwareVersion { .. } | Self::HardwareType { .. } => Terminator::Line,
            _ => Terminator::Auto,
        }
    }
}

impl fmt::Display for HubQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_format_hub_level_queries() {
        assert_eq!(HubQuery::ListRedRats.command(), r#"hubQuery="list redrats""#);
        assert_eq!(HubQuery::HubVersion.command(), r#"hubQuery="hub version""#);
        assert_eq!(HubQuery::ListKeysets.command(), r#"hubQuery="list datasets""#);
    }

    #[test]
    fn should_format_per_device_queries_with_ip() {
        let ip = "10.0.0.5".to_string();
        assert_eq!(
            HubQuery::FirmwareVersion { ip: ip.clone() }.command(),
            r#"hardwareQuery="firmware version" ip="10.0.0.5""#
        );
        assert_eq!(
            HubQuery::HardwareType { ip: ip.clone() }.command(),
            r#"hardwareQuery="hardware type" ip="10.0.0.5""#
        );
        assert_eq!(
            HubQuery::AddIrNetBox { ip }.to_string(),
            r#"hubQuery="add irnetbox" ip="10.0.0.5""#
        );
    }

    #[test]
    fn should_read_single_line_for_per_device_queries() {
        let ip = "10.0.0.5".to_string();
        assert_eq!(HubQuery::FirmwareVersion { ip: ip.clone() }.terminator(), Terminator::Line);
        assert_eq!(HubQuery::HardwareType { ip }.terminator(), Terminator::Line);
        assert_eq!(HubQuery::ListRedRats.terminator(), Terminator::Auto);
    }
}
