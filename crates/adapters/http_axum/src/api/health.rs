//! Health endpoints.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use irhub_app::ports::{ConnectionFactory, Dispatcher};
use irhub_domain::health::HealthStatus;

use crate::state::AppState;

pub enum StatusResponse {
    Ok(Json<HealthStatus>),
}

impl IntoResponse for StatusResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

pub enum RestartResponse {
    NoContent,
}

impl IntoResponse for RestartResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// `GET /api/health`
///
/// Always 200; unhealthy dependencies show in the body.
pub async fn status<F, D>(State(state): State<AppState<F, D>>) -> StatusResponse
where
    F: ConnectionFactory,
    D: Dispatcher,
{
    StatusResponse::Ok(Json(state.health_service.status().await))
}

/// `PUT /api/health/restart`
pub async fn restart<F, D>(State(state): State<AppState<F, D>>) -> RestartResponse
where
    F: ConnectionFactory,
    D: Dispatcher,
{
    match state.health_service.restart().await {
        Some(health) => tracing::info!(hub_up = health.hub_up, "hub pool restarted"),
        None => tracing::info!("no hub configured, nothing to restart"),
    }
    RestartResponse::NoContent
}
