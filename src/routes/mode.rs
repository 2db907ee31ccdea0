use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use gesture_core::{Mode, SessionEvent};

use crate::extractors::JsonBody;
use crate::response::{ok, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetModeRequest {
    pub mode: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_mode).post(set_mode))
}

async fn get_mode(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.session().snapshot();
    ok(snapshot)
}

async fn set_mode(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SetModeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mode: Mode = req
        .mode
        .parse()
        .map_err(|e: gesture_core::session::UnknownMode| {
            AppError::bad_request("INVALID_MODE", &e.to_string())
        })?;

    let (changed, snapshot) = {
        let mut session = state.session();
        let changed = session.set_mode(mode);
        (changed, session.snapshot())
    };

    if changed {
        state.publish(SessionEvent::ModeUpdate { mode });
    }

    Ok(ok(snapshot))
}
