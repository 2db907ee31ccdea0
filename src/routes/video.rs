use std::convert::Infallible;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use crate::response::AppError;
use crate::state::{AppState, ConnectionSlot};

pub const BOUNDARY: &str = "frame";

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(video_feed))
}

/// One multipart part carrying a single JPEG.
pub fn mjpeg_part(jpeg: &[u8]) -> Bytes {
    let head = format!(
        "--{BOUNDARY}\r\nContent-Type: image/jpeg\r\nContent-Length: {}\r\n\r\n",
        jpeg.len()
    );
    let mut part = Vec::with_capacity(head.len() + jpeg.len() + 2);
    part.extend_from_slice(head.as_bytes());
    part.extend_from_slice(jpeg);
    part.extend_from_slice(b"\r\n");
    Bytes::from(part)
}

async fn video_feed(State(state): State<AppState>) -> Result<Response, AppError> {
    let max_video = state.config().max_video_connections;
    let Some(slot) = ConnectionSlot::try_acquire(state.video_connections(), max_video) else {
        return Err(AppError::too_many_requests("Too many video feed connections"));
    };

    let mut frames = state.subscribe_frames();
    let mut shutdown_rx = state.shutdown_rx();

    let stream = async_stream::stream! {
        let _slot = slot;

        // 连接时先推送最近一帧
        let current = frames.borrow_and_update().clone();
        if let Some(jpeg) = current {
            yield Ok::<Bytes, Infallible>(mjpeg_part(&jpeg));
        }

        loop {
            tokio::select! {
                changed = frames.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let latest = frames.borrow_and_update().clone();
                    if let Some(jpeg) = latest {
                        yield Ok(mjpeg_part(&jpeg));
                    }
                }
                _ = shutdown_rx.recv() => {
                    break;
                }
            }
        }
    };

    Ok((
        [
            (
                header::CONTENT_TYPE,
                format!("multipart/x-mixed-replace; boundary={BOUNDARY}"),
            ),
            (header::CACHE_CONTROL, "no-cache".to_string()),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}
