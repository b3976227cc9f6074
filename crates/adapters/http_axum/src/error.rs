//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use irhub_domain::error::IrHubError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`IrHubError`] to an HTTP response with appropriate status code.
pub struct ApiError(IrHubError);

impl From<IrHubError> for ApiError {
    fn from(err: IrHubError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match &self.0 {
            IrHubError::InvalidArgument(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            IrHubError::Configuration(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            IrHubError::Unavailable(err) => (StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
            IrHubError::Protocol(err) => (StatusCode::BAD_GATEWAY, err.to_string()),
            IrHubError::Transport(err) => {
                tracing::error!(error = %err, "transport error");
                (StatusCode::BAD_GATEWAY, format!("transport error: {err}"))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
