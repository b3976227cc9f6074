//! Resend policy for hub commands.

use std::time::Duration;

use irhub_domain::error::IrHubError;
use irhub_domain::framing::Terminator;

use crate::ports::HubConnection;

/// How often, and how patiently, a failed hub command is resent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one.
    pub max_retries: u32,
    /// Pause after reconnecting, before resending.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.max_retries + 1
    }
}

/// Send `command`, reconnecting and resending on transport failures.
///
/// Only [`IrHubError::Transport`] is retried. Reconnect failures are logged
/// and left for the next send to report.
///
/// # Errors
///
/// The last error once attempts are exhausted, or the first non-transient one.
pub async fn send_with_retry<C: HubConnection>(
    conn: &mut C,
    command: &str,
    terminator: Terminator,
    policy: RetryPolicy,
) -> Result<String, IrHubError> {
    let mut attempt = 1;
    loop {
        match conn.send_command(command, terminator).await {
            Ok(reply) => return Ok(reply),
            Err(err) if err.is_transient() && attempt <= policy.max_retries => {
                tracing::warn!(
                    attempt,
                    max_attempts = policy.attempts(),
                    error = %err,
                    "hub command failed, reconnecting"
                );
                conn.close();
                if let Err(err) = conn.connect().await {
                    tracing::debug!(error = %err, "reconnect failed");
                }
                tokio::time::sleep(policy.backoff).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
