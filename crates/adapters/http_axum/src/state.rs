//! Shared application state for axum handlers.

use std::sync::Arc;

use irhub_app::ports::{ConnectionFactory, Dispatcher};
use irhub_app::services::health_service::HealthService;
use irhub_app::services::remote_service::RemoteService;

/// Application state shared across all axum handlers.
///
/// `Clone` is implemented manually so the factory and dispatcher types do
/// not need to be `Clone`; only the `Arc` wrappers are cloned.
pub struct AppState<F: ConnectionFactory, D: Dispatcher> {
    pub remote_service: Arc<RemoteService<F, D>>,
    pub health_service: Arc<HealthService<F, D>>,
}

impl<F: ConnectionFactory, D: Dispatcher> Clone for AppState<F, D> {
    fn clone(&self) -> Self {
        Self {
            remote_service: Arc::clone(&self.remote_service),
            health_service: Arc::clone(&self.health_service),
        }
    }
}

impl<F: ConnectionFactory, D: Dispatcher> AppState<F, D> {
    pub fn new(remote_service: RemoteService<F, D>, health_service: HealthService<F, D>) -> Self {
        Self {
            remote_service: Arc::new(remote_service),
            health_service: Arc::new(health_service),
        }
    }
}
