//! Hub session ports.

use std::future::Future;

use irhub_domain::error::IrHubError;
use irhub_domain::framing::Terminator;

/// One line-oriented session with the hub.
///
/// Implementations report IO failures as [`IrHubError::Transport`] so the
/// retry policy can recognise them.
pub trait HubConnection: Send {
    /// Whether the session currently has an open socket.
    fn is_connected(&self) -> bool;

    /// Open the session, replacing any previous socket.
    fn connect(&mut self) -> impl Future<Output = Result<(), IrHubError>> + Send;

    /// Drop the socket. Idempotent.
    fn close(&mut self);

    /// Write `command` as one line and read the reply until `terminator` fires.
    fn send_command(
        &mut self,
        command: &str,
        terminator: Terminator,
    ) -> impl Future<Output = Result<String, IrHubError>> + Send;
}

/// Builds the sessions a [`ConnectionPool`](crate::pool::ConnectionPool) hands out.
pub trait ConnectionFactory: Send + Sync + 'static {
    type Connection: HubConnection + 'static;

    /// Build a new, not yet connected, session.
    fn create(&self, instance_id: u64) -> Self::Connection;

    /// `host:port` of the hub, for logs and errors.
    fn endpoint(&self) -> String;
}
