//! Common error types used across the workspace.
//!
//! Every failure is classified once, where it happens, into one of the
//! [`IrHubError`] kinds. Only [`IrHubError::Transport`] is retried locally.

use std::time::Duration;

use crate::hardware::HardwareKind;

/// Base error type for the irhub workspace.
#[derive(Debug, thiserror::Error)]
pub enum IrHubError {
    /// Malformed input; no network IO was attempted.
    #[error("invalid argument")]
    InvalidArgument(#[from] InvalidArgumentError),

    /// Unknown hardware, port out of range, missing collaborator.
    #[error("configuration error")]
    Configuration(#[from] ConfigurationError),

    /// No transport could be obtained in time.
    #[error("communicator unavailable")]
    Unavailable(#[from] UnavailableError),

    /// The peer answered, but not with what the command expects.
    #[error("protocol error")]
    Protocol(#[from] ProtocolError),

    /// IO failure while connecting, writing or reading.
    #[error("transport error")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IrHubError {
    /// Wrap an adapter-level IO failure.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Box::new(err))
    }

    /// Whether resending the same command may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Input rejected before any command is sent.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum InvalidArgumentError {
    #[error("key must not be empty")]
    EmptyKey,

    #[error("keyset must not be empty")]
    EmptyKeyset,

    #[error("text must not be empty")]
    EmptyText,

    #[error("invalid channel number: {channel}")]
    InvalidChannel { channel: String },

    #[error("delay must be between 0 and {max_ms} ms, got {delay_ms}")]
    DelayOutOfRange { delay_ms: i64, max_ms: u64 },

    #[error("repeat count {count} exceeds the maximum of {max}")]
    RepeatCountTooLarge { count: u32, max: u32 },

    #[error("command {command} not valid for key set")]
    UnknownSignal { command: String },

    #[error("dispatcher rejected the command: {body}")]
    DispatcherRejected { body: String },

    #[error("invalid device uri: {uri}")]
    InvalidDeviceUri { uri: String },
}

/// Static configuration does not match the request.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("unknown hardware type: {name}")]
    UnknownHardware { name: String },

    #[error("port {port} is not between 1 and {ports}")]
    PortOutOfRange { port: u16, ports: u16 },

    #[error("device {device} is not between 1 and {devices}")]
    DeviceOutOfRange { device: usize, devices: usize },

    #[error("slot {slot} is not between 1 and {slots}")]
    SlotOutOfRange { slot: u32, slots: u32 },

    #[error("invalid host address: {host}")]
    InvalidHost { host: String },

    #[error("no hub configured for {kind} devices")]
    HubNotConfigured { kind: HardwareKind },

    #[error("no dispatcher configured for {kind} devices")]
    DispatcherNotConfigured { kind: HardwareKind },
}

/// The connection pool could not hand out a transport before its wait elapsed.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("no connection to {endpoint} available after {waited:?}")]
pub struct UnavailableError {
    pub endpoint: String,
    pub waited: Duration,
}

/// The peer's answer does not fit the command.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("{hardware} does not know how to handle a {command} command")]
    UnsupportedCommand {
        command: &'static str,
        hardware: HardwareKind,
    },

    #[error("command {command} expected {expected:?} but got {response:?}")]
    UnexpectedResponse {
        command: String,
        expected: &'static str,
        response: String,
    },
}
