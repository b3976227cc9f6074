//! Typed identifier newtypes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a [`DeviceInfo`](crate::device::DeviceInfo).
///
/// Devices are keyed by their hub-visible name when they have one, and by
/// their network host otherwise, so the identifier is the key itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Wrap an existing key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow the key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_compare_by_key() {
        assert_eq!(DeviceId::from("10.0.0.5"), DeviceId::new("10.0.0.5"));
        assert_ne!(DeviceId::from("10.0.0.5"), DeviceId::from("10.0.0.6"));
    }

    #[test]
    fn should_display_raw_key() {
        assert_eq!(DeviceId::from("RR3-lab").to_string(), "RR3-lab");
    }

    #[test]
    fn should_serialize_as_plain_string() {
        let json = serde_json::to_string(&DeviceId::from("10.0.0.5")).unwrap();
        assert_eq!(json, "\"10.0.0.5\"");
    }
}
