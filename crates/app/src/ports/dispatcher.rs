//! HTTP dispatch service port.

use std::future::Future;

use irhub_domain::error::IrHubError;
use irhub_domain::health::DispatcherHealth;

/// Client for the service fronting network-attached IR blasters.
///
/// Every call is a fresh request; there is no pooling or retry at this level.
pub trait Dispatcher: Send + Sync + 'static {
    /// Send one translated key press and return the raw response body.
    fn press_key(&self, query: &str) -> impl Future<Output = Result<String, IrHubError>> + Send;

    /// Fetch the dispatcher's own health report.
    fn health(&self) -> impl Future<Output = Result<DispatcherHealth, IrHubError>> + Send;
}
