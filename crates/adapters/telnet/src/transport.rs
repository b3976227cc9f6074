//! One TCP session with the hub.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use irhub_app::ports::HubConnection;
use irhub_domain::error::IrHubError;
use irhub_domain::framing::{Frame, ResponseFramer, Terminator};

use crate::config::TelnetConfig;
use crate::error::TelnetError;

/// Line-oriented session: one command line out, framed reply lines back.
///
/// Any failure drops the socket, so the next send reports `NotConnected`
/// until the session is reconnected.
pub struct TelnetTransport {
    config: Arc<TelnetConfig>,
    instance_id: u64,
    stream: Option<BufReader<TcpStream>>,
}

impl TelnetTransport {
    #[must_use]
    pub fn new(config: Arc<TelnetConfig>, instance_id: u64) -> Self {
        Self {
            config,
            instance_id,
            stream: None,
        }
    }

    #[must_use]
    pub fn instance_id(&self) -> u64 {
        self.instance_id
    }

    async fn open(&mut self) -> Result<(), TelnetError> {
        let address = self.config.address();
        let timeout = self.config.connect_timeout();
        let stream = tokio::time::timeout(timeout, TcpStream::connect(&address))
            .await
            .map_err(|_| TelnetError::ConnectTimeout {
                address: address.clone(),
                timeout,
            })??;
        stream.set_nodelay(true)?;
        tracing::debug!(instance_id = self.instance_id, %address, "hub session opened");
        self.stream = Some(BufReader::new(stream));
        Ok(())
    }

    async fn exchange(&mut self, command: &str, terminator: Terminator) -> Result<String, TelnetError> {
        let timeout = self.config.read_timeout();
        let stream = self.stream.as_mut().ok_or(TelnetError::NotConnected)?;

        let socket = stream.get_mut();
        socket.write_all(command.as_bytes()).await?;
        socket.write_all(b"\n").await?;
        socket.flush().await?;

        let mut framer = ResponseFramer::new(terminator);
        let mut line = String::new();
        loop {
            line.clear();
            let read = tokio::time::timeout(timeout, stream.read_line(&mut line))
                .await
                .map_err(|_| TelnetError::ReadTimeout { timeout })??;
            if read == 0 {
                return Err(TelnetError::Closed);
            }
            if framer.push(line.trim_end_matches(['\r', '\n'])) == Frame::Complete {
                return Ok(framer.finish());
            }
        }
    }
}

impl HubConnection for TelnetTransport {
    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    async fn connect(&mut self) -> Result<(), IrHubError> {
        self.stream = None;
        self.open().await.map_err(TelnetError::into_domain)
    }

    fn close(&mut self) {
        if self.stream.take().is_some() {
            tracing::debug!(instance_id = self.instance_id, "hub session closed");
        }
    }

    async fn send_command(
        &mut self,
        command: &str,
        terminator: Terminator,
    ) -> Result<String, IrHubError> {
        match self.exchange(command, terminator).await {
            Ok(reply) => {
                tracing::trace!(instance_id = self.instance_id, %reply, "hub reply");
                Ok(reply)
            }
            Err(err) => {
                self.stream = None;
                Err(err.into_domain())
            }
        }
    }
}
