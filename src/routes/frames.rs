use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use image::RgbImage;
use serde::{Deserialize, Serialize};

use gesture_core::controller::FaceReport;
use gesture_core::{
    Direction, Frame, LandmarkSet, Mode, Point, PointerAction, SessionSnapshot, SessionTick,
};

use crate::codec;
use crate::extractors::JsonBody;
use crate::response::{ok, AppError};
use crate::state::AppState;

/// Largest canvas accepted when no image is sent.
const MAX_CANVAS_SIDE: u32 = 4096;

/// Landmarks may sit slightly off-frame, but never further than one canvas side.
const MAX_LANDMARK_COORD: i32 = 2 * MAX_CANVAS_SIDE as i32;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameRequest {
    /// `data:image/...;base64,` URL or bare base64 JPEG/PNG
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    /// One entry per face, 68 `[x, y]` pairs each, in raw camera coordinates
    #[serde(default)]
    pub faces: Vec<Vec<[i32; 2]>>,
    #[serde(default = "default_true")]
    pub return_image: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceMetrics {
    pub ear: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_ear: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_ear: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mar: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nose: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

impl From<&FaceReport> for FaceMetrics {
    fn from(report: &FaceReport) -> Self {
        let r = &report.reading;
        Self {
            ear: r.ear,
            left_ear: Some(r.left_ear),
            right_ear: Some(r.right_ear),
            mar: Some(r.mar),
            nose: Some(r.nose),
            direction: report.decision.direction,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameResponse {
    pub mode: Mode,
    pub input_mode: bool,
    pub scroll_mode: bool,
    pub warning: bool,
    pub warning_count: u64,
    pub faces: Vec<FaceMetrics>,
    pub actions: Vec<PointerAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl FrameResponse {
    fn build(tick: &SessionTick, snapshot: SessionSnapshot, image: Option<String>) -> Self {
        let mut faces = Vec::new();
        let mut actions = Vec::new();
        if let Some(control) = &tick.control {
            faces.extend(control.faces.iter().map(FaceMetrics::from));
            actions.extend(control.actions().copied());
        }
        if let Some(report) = &tick.warning {
            faces.extend(report.ears.iter().map(|&ear| FaceMetrics {
                ear,
                left_ear: None,
                right_ear: None,
                mar: None,
                nose: None,
                direction: None,
            }));
        }

        Self {
            mode: snapshot.mode,
            input_mode: snapshot.input_mode,
            scroll_mode: snapshot.scroll_mode,
            warning: tick.warning.as_ref().is_some_and(|w| w.warning),
            warning_count: snapshot.warning_count,
            faces,
            actions,
            image,
        }
    }
}

struct TickOutput {
    tick: SessionTick,
    snapshot: SessionSnapshot,
    jpeg: Bytes,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(submit_frame))
}

async fn submit_frame(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<FrameRequest>,
) -> Result<impl IntoResponse, AppError> {
    let faces = parse_faces(&req.faces)?;
    let canvas = canvas_size(&state, req.width, req.height)?;
    let return_image = req.return_image;
    let image = req.image;

    let worker = state.clone();
    let output = tokio::task::spawn_blocking(move || run_tick(&worker, image, canvas, faces))
        .await
        .map_err(|e| AppError::internal(&format!("frame worker failed: {e}")))??;

    for event in &output.tick.events {
        state.publish(event.clone());
    }
    state.publish_frame(output.jpeg.clone());

    let image = return_image.then(|| codec::jpeg_data_url(&output.jpeg));
    Ok(ok(FrameResponse::build(&output.tick, output.snapshot, image)))
}

fn parse_faces(raw: &[Vec<[i32; 2]>]) -> Result<Vec<LandmarkSet>, AppError> {
    let in_range = |v: i32| (-MAX_LANDMARK_COORD..=MAX_LANDMARK_COORD).contains(&v);
    raw.iter()
        .map(|pts| {
            if let Some([x, y]) = pts.iter().find(|[x, y]| !in_range(*x) || !in_range(*y)) {
                return Err(AppError::bad_request(
                    "INVALID_LANDMARKS",
                    &format!("landmark ({x}, {y}) outside ±{MAX_LANDMARK_COORD}"),
                ));
            }
            let points: Vec<Point> = pts.iter().map(|[x, y]| Point::new(*x, *y)).collect();
            LandmarkSet::try_from(points).map_err(AppError::from)
        })
        .collect()
}

fn canvas_size(
    state: &AppState,
    width: Option<u32>,
    height: Option<u32>,
) -> Result<(u32, u32), AppError> {
    let defaults = state.config().frame;
    let w = width.unwrap_or(defaults.default_width);
    let h = height.unwrap_or(defaults.default_height);
    if w == 0 || h == 0 || w > MAX_CANVAS_SIDE || h > MAX_CANVAS_SIDE {
        return Err(AppError::bad_request(
            "INVALID_FRAME_SIZE",
            &format!("frame size must be within 1..={MAX_CANVAS_SIDE}"),
        ));
    }
    Ok((w, h))
}

fn run_tick(
    state: &AppState,
    image: Option<String>,
    (width, height): (u32, u32),
    faces: Vec<LandmarkSet>,
) -> Result<TickOutput, AppError> {
    let image = match image {
        Some(encoded) => codec::decode_image(&encoded)?,
        None => RgbImage::new(width, height),
    };
    let mut frame = Frame::new(image, faces);

    let (tick, snapshot) = {
        let mut session = state.session();
        let tick = session.process_frame(&mut frame, Instant::now());
        (tick, session.snapshot())
    };

    let jpeg = codec::encode_jpeg(&frame.image, state.config().frame.jpeg_quality)?;
    tracing::debug!(
        mode = %snapshot.mode,
        faces = frame.faces.len(),
        events = tick.events.len(),
        "Frame processed"
    );

    Ok(TickOutput {
        tick,
        snapshot,
        jpeg: Bytes::from(jpeg),
    })
}
