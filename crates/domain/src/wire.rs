//! Per-family wire formats.
//!
//! A [`WireTranslator`] turns one leaf [`Command`] plus the device address and
//! port into the exact text a hardware family expects, together with the
//! token that marks a successful reply. Translators hold no state.

use crate::command::{Command, Hold};
use crate::device::DeviceInfo;
use crate::error::{IrHubError, InvalidArgumentError, ProtocolError};
use crate::framing::OK;
use crate::hardware::HardwareKind;

/// Reply marker the dispatcher includes on success.
pub const SUCCESS: &str = "success";

const UNKNOWN_SIGNAL: &str = "Failed to find signal ";
const DISPATCHER_ERROR: &str = "Error";

/// How a reply is judged successful.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    /// The whole reply must equal the token.
    Exact(&'static str),
    /// The reply must contain the token.
    Contains(&'static str),
}

impl Expect {
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Exact(token) | Self::Contains(token) => token,
        }
    }

    #[must_use]
    pub fn matches(self, response: &str) -> bool {
        match self {
            Self::Exact(token) => response.trim() == token,
            Self::Contains(token) => response.contains(token),
        }
    }

    /// Classify a reply to `command`.
    ///
    /// # Errors
    ///
    /// [`InvalidArgumentError::UnknownSignal`] when the hub does not know the
    /// key, [`InvalidArgumentError::DispatcherRejected`] when the dispatcher
    /// reports an error, [`ProtocolError::UnexpectedResponse`] otherwise.
    pub fn check(self, command: &str, response: &str) -> Result<(), IrHubError> {
        if self.matches(response) {
            return Ok(());
        }
        match self {
            Self::Exact(_) if response.contains(UNKNOWN_SIGNAL) => {
                Err(InvalidArgumentError::UnknownSignal {
                    command: command.to_string(),
                }
                .into())
            }
            Self::Contains(_) if response.contains(DISPATCHER_ERROR) => {
                Err(InvalidArgumentError::DispatcherRejected {
                    body: response.to_string(),
                }
                .into())
            }
            _ => Err(ProtocolError::UnexpectedResponse {
                command: command.to_string(),
                expected: self.token(),
                response: response.to_string(),
            }
            .into()),
        }
    }
}

/// A translated leaf, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireCommand {
    pub payload: String,
    pub expect: Expect,
}

/// Formats single leaves for one hardware family.
pub trait WireTranslator: Send + Sync + std::fmt::Debug {
    /// Translate `leaf` for output `port` of `device`.
    ///
    /// Returns `None` for leaves this family cannot express (delays, groups).
    fn translate(&self, device: &DeviceInfo, port: u16, leaf: &Command) -> Option<WireCommand>;
}

/// irNetBox behind the hub, addressed by IP and output.
#[derive(Debug, Clone, Copy, Default)]
pub struct HubIpTranslator;

/// RedRat3 behind the hub, addressed by name. Single output, so no port.
#[derive(Debug, Clone, Copy, Default)]
pub struct HubNameTranslator;

/// iTach behind the dispatcher, addressed by host and IR port.
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatcherHostTranslator;

/// GC-100 behind the dispatcher, addressed by module and port.
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatcherModuleTranslator;

static HUB_IP: HubIpTranslator = HubIpTranslator;
static HUB_NAME: HubNameTranslator = HubNameTranslator;
static DISPATCHER_HOST: DispatcherHostTranslator = DispatcherHostTranslator;
static DISPATCHER_MODULE: DispatcherModuleTranslator = DispatcherModuleTranslator;

/// Strategy table from hardware kind to translator.
#[must_use]
pub fn translator_for(kind: HardwareKind) -> &'static dyn WireTranslator {
    match kind {
        HardwareKind::IrNetBoxPro3 => &HUB_IP,
        HardwareKind::RedRat3 => &HUB_NAME,
        HardwareKind::Itach => &DISPATCHER_HOST,
        HardwareKind::Gc100 | HardwareKind::Gc100_12 | HardwareKind::Gc100_6 => {
            &DISPATCHER_MODULE
        }
    }
}

fn hub_hold(hold: Option<Hold>) -> String {
    match hold {
        Some(Hold::Repeats(n)) => format!(r#" repeats="{n}""#),
        Some(Hold::Seconds(s)) => format!(r#" duration="{}""#, u64::from(s) * 1000),
        None => String::new(),
    }
}

fn dispatcher_signal(keyset: &str, key: &str, hold: Option<Hold>) -> String {
    let suffix = match hold {
        Some(Hold::Repeats(n)) => format!("&repeats={n}"),
        Some(Hold::Seconds(s)) => format!("&duration={}", u64::from(s) * 1000),
        None => String::new(),
    };
    format!(
        "keyset={}&key={}{suffix}",
        keyset.to_uppercase(),
        key.to_uppercase().replace(' ', "_")
    )
}

fn signal_of(leaf: &Command) -> Option<(&str, &str, Option<Hold>)> {
    match leaf {
        Command::PressKey { key, keyset } => Some((keyset, key, None)),
        Command::PressAndHold { key, keyset, hold } => Some((keyset, key, Some(*hold))),
        Command::Delay(_) | Command::Group(_) => None,
    }
}

impl WireTranslator for HubIpTranslator {
    fn translate(&self, device: &DeviceInfo, port: u16, leaf: &Command) -> Option<WireCommand> {
        let (keyset, key, hold) = signal_of(leaf)?;
        Some(WireCommand {
            payload: format!(
                r#"ip="{}" dataset="{keyset}" signal="{key}" output="{port}"{}"#,
                device.host(),
                hub_hold(hold)
            ),
            expect: Expect::Exact(OK),
        })
    }
}

impl WireTranslator for HubNameTranslator {
    fn translate(&self, device: &DeviceInfo, _port: u16, leaf: &Command) -> Option<WireCommand> {
        let (keyset, key, hold) = signal_of(leaf)?;
        Some(WireCommand {
            payload: format!(
                r#"name="{}" dataset="{keyset}" signal="{key}"{}"#,
                device.wire_name(),
                hub_hold(hold)
            ),
            expect: Expect::Exact(OK),
        })
    }
}

impl WireTranslator for DispatcherHostTranslator {
    fn translate(&self, device: &DeviceInfo, port: u16, leaf: &Command) -> Option<WireCommand> {
        let (keyset, key, hold) = signal_of(leaf)?;
        Some(WireCommand {
            payload: format!(
                "host={}&ir_port_number={port}&{}",
                device.host(),
                dispatcher_signal(keyset, key, hold)
            ),
            expect: Expect::Contains(SUCCESS),
        })
    }
}

impl WireTranslator for DispatcherModuleTranslator {
    fn translate(&self, device: &DeviceInfo, port: u16, leaf: &Command) -> Option<WireCommand> {
        let (keyset, key, hold) = signal_of(leaf)?;
        let module = device.module().unwrap_or(device.host());
        Some(WireCommand {
            payload: format!(
                "module={module}:{port}&{}",
                dispatcher_signal(keyset, key, hold)
            ),
            expect: Expect::Contains(SUCCESS),
        })
    }
}
