//! Remote action endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use irhub_app::ports::{ConnectionFactory, Dispatcher};
use irhub_app::services::remote::Remote;
use irhub_domain::error::IrHubError;
use irhub_domain::keypad::KeyStep;

use crate::error::ApiError;
use crate::state::AppState;

/// Query of a URI-addressed action: `?uri=itach://10.0.0.6&port=2`.
#[derive(Debug, Deserialize)]
pub struct RemoteTarget {
    pub uri: String,
    pub port: u16,
}

/// Body of an action request: the keyset, optional remote settings and the
/// action itself, tagged by `action`.
#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    pub keyset: String,
    /// Pause after each successful send, in milliseconds.
    #[serde(default)]
    pub settle_ms: Option<i64>,
    /// Skip the trailing `SELECT` when tuning.
    #[serde(default)]
    pub auto_tune: bool,
    #[serde(flatten)]
    pub action: Action,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    PressKey {
        key: String,
        #[serde(default)]
        wait_ms: Option<i64>,
    },
    PressKeys {
        keys: Vec<String>,
        #[serde(default)]
        interval_ms: i64,
    },
    PressKeyAndHold {
        key: String,
        count: i64,
    },
    PressKeyAndHoldDuration {
        key: String,
        seconds: i64,
    },
    Tune {
        channel: String,
        #[serde(default)]
        interval_ms: Option<i64>,
    },
    SendText {
        text: String,
    },
    Shorthand {
        sequence: String,
        #[serde(default)]
        interval_ms: i64,
    },
    CustomSequence {
        steps: Vec<KeyStep>,
    },
}

impl ActionRequest {
    async fn apply<F, D>(self, mut remote: Remote<F, D>) -> Result<(), IrHubError>
    where
        F: ConnectionFactory,
        D: Dispatcher,
    {
        if let Some(settle_ms) = self.settle_ms {
            remote.set_delay(settle_ms)?;
        }
        remote.set_auto_tune(self.auto_tune);

        match &self.action {
            Action::PressKey { key, wait_ms: None } => remote.press_key(key).await,
            Action::PressKey {
                key,
                wait_ms: Some(wait_ms),
            } => remote.press_key_then_wait(key, *wait_ms).await,
            Action::PressKeys { keys, interval_ms } => remote.press_keys(keys, *interval_ms).await,
            Action::PressKeyAndHold { key, count } => remote.press_key_and_hold(key, *count).await,
            Action::PressKeyAndHoldDuration { key, seconds } => {
                remote.press_key_and_hold_for(key, *seconds).await
            }
            Action::Tune {
                channel,
                interval_ms: None,
            } => remote.tune(channel).await,
            Action::Tune {
                channel,
                interval_ms: Some(interval_ms),
            } => remote.tune_with_delay(channel, *interval_ms).await,
            Action::SendText { text } => remote.send_text(text).await,
            Action::Shorthand {
                sequence,
                interval_ms,
            } => remote.send_shorthand(sequence, *interval_ms).await,
            Action::CustomSequence { steps } => remote.custom_sequence(steps).await,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Success {
    pub success: bool,
}

pub enum ActionResponse {
    Ok(Json<Success>),
}

impl IntoResponse for ActionResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `POST /api/devices/{device}/ports/{port}/actions`
pub async fn for_port<F, D>(
    State(state): State<AppState<F, D>>,
    Path((device, port)): Path<(usize, u16)>,
    Json(request): Json<ActionRequest>,
) -> Result<ActionResponse, ApiError>
where
    F: ConnectionFactory,
    D: Dispatcher,
{
    let remote = state
        .remote_service
        .remote_for_device(device, port, &request.keyset)
        .await?;
    request.apply(remote).await?;
    Ok(ActionResponse::Ok(Json(Success { success: true })))
}

/// `POST /api/slots/{slot}/actions`
pub async fn for_slot<F, D>(
    State(state): State<AppState<F, D>>,
    Path(slot): Path<u32>,
    Json(request): Json<ActionRequest>,
) -> Result<ActionResponse, ApiError>
where
    F: ConnectionFactory,
    D: Dispatcher,
{
    let remote = state
        .remote_service
        .remote_for_slot(slot, &request.keyset)
        .await?;
    request.apply(remote).await?;
    Ok(ActionResponse::Ok(Json(Success { success: true })))
}

/// `POST /api/remotes/actions?uri=..&port=..`
pub async fn for_uri<F, D>(
    State(state): State<AppState<F, D>>,
    Query(target): Query<RemoteTarget>,
    Json(request): Json<ActionRequest>,
) -> Result<ActionResponse, ApiError>
where
    F: ConnectionFactory,
    D: Dispatcher,
{
    let remote = state
        .remote_service
        .remote_for_uri(&target.uri, target.port, &request.keyset)
        .await?;
    request.apply(remote).await?;
    Ok(ActionResponse::Ok(Json(Success { success: true })))
}
