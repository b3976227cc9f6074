//! Inventory endpoints.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use irhub_app::ports::{ConnectionFactory, Dispatcher};
use irhub_domain::device::DeviceInfo;
use irhub_domain::inventory::Inventory;

use crate::error::ApiError;
use crate::state::AppState;

/// A resolved device output.
#[derive(Debug, Serialize)]
pub struct PortDescription {
    /// 1-based inventory number.
    pub device: usize,
    pub port: u16,
    pub uri: String,
    /// Outputs the hardware has.
    pub ports: u16,
    #[serde(flatten)]
    pub info: DeviceInfo,
}

pub enum ListResponse {
    Ok(Json<Inventory>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

pub enum PortResponse {
    Ok(Json<PortDescription>),
}

impl IntoResponse for PortResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/devices`
pub async fn list<F, D>(State(state): State<AppState<F, D>>) -> ListResponse
where
    F: ConnectionFactory,
    D: Dispatcher,
{
    ListResponse::Ok(Json(state.remote_service.inventory().clone()))
}

/// `GET /api/devices/{device}/ports/{port}`
pub async fn port<F, D>(
    State(state): State<AppState<F, D>>,
    Path((device, port)): Path<(usize, u16)>,
) -> Result<PortResponse, ApiError>
where
    F: ConnectionFactory,
    D: Dispatcher,
{
    let resolved = state.remote_service.device_at(device, port).await?;
    let info = resolved.info().clone();
    Ok(PortResponse::Ok(Json(PortDescription {
        device,
        port,
        uri: info.uri(),
        ports: info.port_count(),
        info,
    })))
}
