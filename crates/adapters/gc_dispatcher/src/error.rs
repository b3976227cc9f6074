//! Dispatcher adapter error types.

use irhub_domain::error::IrHubError;

#[derive(Debug, thiserror::Error)]
pub enum DispatcherError {
    /// Building the client, sending, or reading the body failed.
    #[error("dispatcher request failed")]
    Request(#[from] reqwest::Error),

    /// The health endpoint answered with a non-success status.
    #[error("dispatcher returned status {status}")]
    Status { status: u16 },
}

impl DispatcherError {
    pub fn into_domain(self) -> IrHubError {
        IrHubError::transport(self)
    }
}

impl From<DispatcherError> for IrHubError {
    fn from(err: DispatcherError) -> Self {
        err.into_domain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_status_error() {
        let err = DispatcherError::Status { status: 503 };
        assert_eq!(err.to_string(), "dispatcher returned status 503");
    }

    #[test]
    fn should_convert_to_transport_error() {
        let err: IrHubError = DispatcherError::Status { status: 500 }.into();
        assert!(matches!(err, IrHubError::Transport(_)));
    }
}
