//! Telnet adapter error types.

use std::time::Duration;

use irhub_domain::error::IrHubError;

/// Errors raised by a hub session.
#[derive(Debug, thiserror::Error)]
pub enum TelnetError {
    /// Socket read, write or connect failed.
    #[error("hub i/o error")]
    Io(#[from] std::io::Error),

    #[error("timed out connecting to hub at {address} after {}ms", .timeout.as_millis())]
    ConnectTimeout { address: String, timeout: Duration },

    #[error("no reply line from hub within {}ms", .timeout.as_millis())]
    ReadTimeout { timeout: Duration },

    /// A command was sent on a session that is not open.
    #[error("hub session not connected")]
    NotConnected,

    /// The hub closed the socket mid-reply.
    #[error("hub closed the connection")]
    Closed,
}

impl TelnetError {
    /// Every session failure is a transport fault the retry loop may recover.
    pub fn into_domain(self) -> IrHubError {
        IrHubError::transport(self)
    }
}

impl From<TelnetError> for IrHubError {
    fn from(err: TelnetError) -> Self {
        err.into_domain()
    }
}
