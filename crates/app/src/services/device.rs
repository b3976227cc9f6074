//! Devices and their ports.
//!
//! A [`Device`] is one IR blaster with a fixed set of outputs. Sending goes
//! through a [`Port`], which serializes commands for its output, translates
//! each leaf for the device's hardware family and hands it to the device's
//! transport: a pooled hub session or a one-shot dispatcher call.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use irhub_domain::command::Command;
use irhub_domain::device::DeviceInfo;
use irhub_domain::error::{ConfigurationError, IrHubError, ProtocolError, UnavailableError};
use irhub_domain::framing::Terminator;
use irhub_domain::wire::{WireCommand, WireTranslator, translator_for};

use crate::pool::ConnectionPool;
use crate::ports::{ConnectionFactory, Dispatcher};
use crate::retry::{RetryPolicy, send_with_retry};

/// Hub round-trips slower than this are logged as warnings.
const SLOW_ROUND_TRIP: Duration = Duration::from_millis(1500);

/// How a device's commands reach the hardware.
pub enum Link<F: ConnectionFactory, D> {
    Hub(ConnectionPool<F>),
    Dispatcher(Arc<D>),
}

impl<F: ConnectionFactory, D> Clone for Link<F, D> {
    fn clone(&self) -> Self {
        match self {
            Self::Hub(pool) => Self::Hub(pool.clone()),
            Self::Dispatcher(dispatcher) => Self::Dispatcher(Arc::clone(dispatcher)),
        }
    }
}

struct PortState {
    number: u16,
    guard: Mutex<()>,
}

/// One IR blaster.
pub struct Device<F: ConnectionFactory, D> {
    info: DeviceInfo,
    link: Link<F, D>,
    translator: &'static dyn WireTranslator,
    retry: RetryPolicy,
    ports: Vec<PortState>,
}

impl<F: ConnectionFactory, D: Dispatcher> Device<F, D> {
    /// Build a device with one port per hardware output.
    pub fn new(info: DeviceInfo, link: Link<F, D>, retry: RetryPolicy) -> Self {
        let ports = (1..=info.port_count())
            .map(|number| PortState {
                number,
                guard: Mutex::new(()),
            })
            .collect();
        Self {
            translator: translator_for(info.kind()),
            info,
            link,
            retry,
            ports,
        }
    }

    #[must_use]
    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    /// Port numbers, ascending.
    pub fn port_numbers(&self) -> impl Iterator<Item = u16> + '_ {
        self.ports.iter().map(|p| p.number)
    }

    /// Look up a port by its 1-based number.
    #[must_use]
    pub fn port(&self, number: u16) -> Option<Port<'_, F, D>> {
        self.ports
            .iter()
            .find(|p| p.number == number)
            .map(|state| Port {
                device: self,
                state,
            })
    }

    /// Like [`port`](Self::port), but an unknown number is an error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::PortOutOfRange`].
    pub fn require_port(&self, number: u16) -> Result<Port<'_, F, D>, IrHubError> {
        self.port(number).ok_or_else(|| {
            ConfigurationError::PortOutOfRange {
                port: number,
                ports: self.info.port_count(),
            }
            .into()
        })
    }

    async fn dispatch(&self, wire: &WireCommand) -> Result<String, IrHubError> {
        match &self.link {
            Link::Hub(pool) => self.send_to_hub(pool, &wire.payload).await,
            Link::Dispatcher(dispatcher) => dispatcher.press_key(&wire.payload).await,
        }
    }

    async fn send_to_hub(
        &self,
        pool: &ConnectionPool<F>,
        payload: &str,
    ) -> Result<String, IrHubError> {
        let mut conn = pool.get_connection().await.ok_or_else(|| UnavailableError {
            endpoint: pool.endpoint(),
            waited: pool.settings().wait,
        })?;
        let started = Instant::now();
        let result = send_with_retry(&mut *conn, payload, Terminator::Auto, self.retry).await;
        let elapsed = started.elapsed();
        if elapsed > SLOW_ROUND_TRIP {
            tracing::warn!(
                transaction_id = conn.transaction_id(),
                elapsed_ms = elapsed.as_millis(),
                "slow hub round-trip"
            );
        }
        pool.release_connection(conn);
        result
    }
}

impl<F: ConnectionFactory, D> PartialEq for Device<F, D> {
    fn eq(&self, other: &Self) -> bool {
        self.info == other.info
    }
}

/// One output of a [`Device`].
pub struct Port<'a, F: ConnectionFactory, D> {
    device: &'a Device<F, D>,
    state: &'a PortState,
}

impl<F: ConnectionFactory, D: Dispatcher> Port<'_, F, D> {
    #[must_use]
    pub fn number(&self) -> u16 {
        self.state.number
    }

    #[must_use]
    pub fn device(&self) -> &Device<F, D> {
        self.device
    }

    /// Send every leaf of `command`, in order.
    ///
    /// Concurrent sends to the same port wait for each other. The first
    /// failing leaf aborts the rest; leaves already sent stay sent.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::UnsupportedCommand`] when the hardware cannot express
    /// a leaf, [`IrHubError::Unavailable`] when no hub session frees up in
    /// time, otherwise whatever the transport or the reply check reports.
    #[tracing::instrument(
        skip(self, command),
        fields(
            device = %self.device.info.id(),
            port = self.state.number,
            command = command.display_name(),
        )
    )]
    pub async fn send(&self, command: &Command) -> Result<(), IrHubError> {
        let _serialized = self.state.guard.lock().await;
        for leaf in command.flatten() {
            if let Command::Delay(pause) = leaf {
                tokio::time::sleep(*pause).await;
                continue;
            }
            let wire = self
                .device
                .translator
                .translate(&self.device.info, self.state.number, leaf)
                .ok_or(ProtocolError::UnsupportedCommand {
                    command: leaf.kind_name(),
                    hardware: self.device.info.kind(),
                })?;
            tracing::info!(payload = %wire.payload, "sending");
            let reply = self.device.dispatch(&wire).await?;
            wire.expect.check(&wire.payload, &reply)?;
        }
        Ok(())
    }
}
