pub mod frames;
pub mod health;
pub mod mode;
pub mod realtime;
pub mod video;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::services::{ServeDir, ServeFile};

use crate::middleware::request_id;
use crate::state::AppState;

/// Maximum request body size: 8 MiB, enough for a base64 frame.
const MAX_BODY_SIZE: usize = 8 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .nest("/mode", mode::router())
        .nest("/frames", frames::router())
        .nest("/realtime", realtime::router())
        .nest("/video_feed", video::router())
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE));

    let static_files =
        ServeDir::new("static").not_found_service(ServeFile::new("static/index.html"));

    Router::new()
        .nest("/api", api_routes)
        .nest("/health", health::router())
        .fallback_service(static_files)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .with_state(state)
}
