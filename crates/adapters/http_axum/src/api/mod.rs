//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod actions;
#[allow(clippy::missing_errors_doc)]
pub mod devices;
pub mod health;

use axum::Router;
use axum::routing::{get, post, put};

use irhub_app::ports::{ConnectionFactory, Dispatcher};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<F, D>() -> Router<AppState<F, D>>
where
    F: ConnectionFactory,
    D: Dispatcher,
{
    Router::new()
        // Health
        .route("/health", get(health::status::<F, D>))
        .route("/health/restart", put(health::restart::<F, D>))
        // Inventory
        .route("/devices", get(devices::list::<F, D>))
        .route("/devices/{device}/ports/{port}", get(devices::port::<F, D>))
        // Remote actions
        .route(
            "/devices/{device}/ports/{port}/actions",
            post(actions::for_port::<F, D>),
        )
        .route("/slots/{slot}/actions", post(actions::for_slot::<F, D>))
        .route("/remotes/actions", post(actions::for_uri::<F, D>))
}
