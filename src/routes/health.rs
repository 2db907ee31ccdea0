use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::atomic::Ordering;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health_check))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
}

pub async fn health_check(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let mode = state.session().mode();
    Json(serde_json::json!({
        "status": "ok",
        "startedAt": state.started_at().to_rfc3339(),
        "uptimeSecs": state.uptime_secs(),
        "mode": mode,
        "pointerBackend": state.config().pointer_backend.as_str(),
        "sseConnections": state.sse_connections().load(Ordering::Relaxed),
    }))
}

pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

pub async fn readiness() -> StatusCode {
    StatusCode::OK
}
