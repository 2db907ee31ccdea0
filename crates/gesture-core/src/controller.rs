//! 面部手势控制状态机
//!
//! 每帧按固定顺序评估每张人脸：
//! 张嘴切换输入模式 → 双眼闭合切换滚动模式 → 左眼单闭左键 → 右眼单闭右键 → 鼻尖位移移动。
//! 后面的判断会看到同一帧内前面判断已更新的模式标志，顺序不可调整。
//!
//! 状态空间为 {active} × {input_mode} × {scroll_mode}。滚动模式在退出输入模式时
//! 不会被清除，下次进入输入模式时沿用。

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::annotate::{FrameAnnotator, Overlay, BLUE, GREEN, RED};
use crate::direction::{direction, Direction};
use crate::dispatcher::{ActionDispatcher, MouseButton, PointerAction};
use crate::ear::eye_aspect_ratio;
use crate::font;
use crate::frame::Frame;
use crate::landmarks::{LandmarkSet, Point};
use crate::mouth::mouth_aspect_ratio;

/// EAR 低于此值视为闭眼
pub const EYE_AR_THRESHOLD: f64 = 0.19;
/// MAR 高于此值视为张嘴
pub const MOUTH_AR_THRESHOLD: f64 = 0.3;
/// 输入模式 / 滚动模式切换冷却
pub const MODE_COOLDOWN: Duration = Duration::from_secs(1);
/// 单击冷却
pub const CLICK_COOLDOWN: Duration = Duration::from_millis(500);
/// 鼻尖水平位移阈值（像素）
pub const MOVE_THRESHOLD_X: i32 = 30;
/// 鼻尖垂直位移阈值（像素）
pub const MOVE_THRESHOLD_Y: i32 = 15;

/// 单张人脸在一帧内的几何读数
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceReading {
    pub mar: f64,
    pub left_ear: f64,
    pub right_ear: f64,
    pub ear: f64,
    pub nose: Point,
}

impl FaceReading {
    pub fn new(mar: f64, left_ear: f64, right_ear: f64, nose: Point) -> Self {
        Self {
            mar,
            left_ear,
            right_ear,
            ear: (left_ear + right_ear) / 2.0,
            nose,
        }
    }

    pub fn from_landmarks(face: &LandmarkSet) -> Self {
        Self::new(
            mouth_aspect_ratio(face.mouth()),
            eye_aspect_ratio(face.left_eye()),
            eye_aspect_ratio(face.right_eye()),
            face.nose_tip(),
        )
    }
}

/// 单张人脸评估后产生的状态变化与动作
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceDecision {
    /// 本帧输入模式被切换后的新值
    pub input_toggled: Option<bool>,
    /// 本帧滚动模式被切换后的新值
    pub scroll_toggled: Option<bool>,
    pub click: Option<MouseButton>,
    pub direction: Option<Direction>,
    /// 成功分发的指针动作
    pub actions: Vec<PointerAction>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceReport {
    pub reading: FaceReading,
    pub decision: FaceDecision,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickReport {
    pub faces: Vec<FaceReport>,
}

impl TickReport {
    pub fn actions(&self) -> impl Iterator<Item = &PointerAction> + '_ {
        self.faces.iter().flat_map(|f| f.decision.actions.iter())
    }

    /// 本帧是否有任何模式切换
    pub fn mode_changed(&self) -> bool {
        self.faces.iter().any(|f| {
            f.decision.input_toggled.is_some() || f.decision.scroll_toggled.is_some()
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GestureState {
    active: bool,
    input_mode: bool,
    scroll_mode: bool,
    anchor_point: Point,
    last_mouth_toggle: Option<Instant>,
    last_blink_toggle: Option<Instant>,
    last_left_click: Option<Instant>,
    last_right_click: Option<Instant>,
}

impl GestureState {
    pub fn active(&self) -> bool {
        self.active
    }

    pub fn input_mode(&self) -> bool {
        self.input_mode
    }

    pub fn scroll_mode(&self) -> bool {
        self.scroll_mode
    }

    pub fn anchor_point(&self) -> Point {
        self.anchor_point
    }
}

fn cooled_down(last: Option<Instant>, now: Instant, cooldown: Duration) -> bool {
    match last {
        None => true,
        Some(at) => now.saturating_duration_since(at) > cooldown,
    }
}

pub struct GestureController {
    state: GestureState,
    dispatcher: ActionDispatcher,
    annotator: FrameAnnotator,
}

impl GestureController {
    pub fn new(dispatcher: ActionDispatcher) -> Self {
        Self {
            state: GestureState::default(),
            dispatcher,
            annotator: FrameAnnotator,
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    pub fn activate(&mut self) {
        self.state.active = true;
        self.state.input_mode = false;
        self.state.scroll_mode = false;
        tracing::info!("Eye controller activated");
    }

    pub fn deactivate(&mut self) {
        self.state.active = false;
        self.state.input_mode = false;
        self.state.scroll_mode = false;
        tracing::info!("Eye controller deactivated");
    }

    /// 处理一帧：镜像、逐脸评估、绘制叠加层
    ///
    /// 未激活时直接返回，帧保持原样。
    pub fn process_frame(&mut self, frame: &mut Frame, now: Instant) -> TickReport {
        let mut report = TickReport::default();
        if !self.state.active {
            return report;
        }

        frame.mirror();
        let (width, height) = (frame.width(), frame.height());

        let mut overlay = Overlay::new();
        for face in &frame.faces {
            let reading = FaceReading::from_landmarks(face);
            let decision = self.evaluate(&reading, now);
            overlay.extend(self.face_overlay(face, &reading, &decision, width, height));
            report.faces.push(FaceReport { reading, decision });
        }

        self.annotator.draw(&mut frame.image, &overlay);
        report
    }

    /// 状态机单步：不镜像、不绘制
    pub fn evaluate(&mut self, reading: &FaceReading, now: Instant) -> FaceDecision {
        let mut decision = FaceDecision::default();
        let state = &mut self.state;

        if reading.mar > MOUTH_AR_THRESHOLD
            && cooled_down(state.last_mouth_toggle, now, MODE_COOLDOWN)
        {
            state.input_mode = !state.input_mode;
            state.last_mouth_toggle = Some(now);
            if state.input_mode {
                state.anchor_point = reading.nose;
                tracing::info!(anchor = ?reading.nose, "Input mode activated");
            } else {
                tracing::info!("Input mode deactivated");
            }
            decision.input_toggled = Some(state.input_mode);
        }

        if reading.ear < EYE_AR_THRESHOLD
            && cooled_down(state.last_blink_toggle, now, MODE_COOLDOWN)
        {
            state.scroll_mode = !state.scroll_mode;
            state.last_blink_toggle = Some(now);
            if state.scroll_mode {
                tracing::info!("Scroll mode activated");
            } else {
                tracing::info!("Scroll mode deactivated");
            }
            decision.scroll_toggled = Some(state.scroll_mode);
        }

        if reading.left_ear < EYE_AR_THRESHOLD
            && reading.right_ear >= EYE_AR_THRESHOLD
            && cooled_down(state.last_left_click, now, CLICK_COOLDOWN)
            && state.input_mode
        {
            state.last_left_click = Some(now);
            decision.click = Some(MouseButton::Left);
            match self.dispatcher.dispatch_click(MouseButton::Left) {
                Ok(action) => {
                    tracing::info!("Left click performed");
                    decision.actions.push(action);
                }
                Err(e) => tracing::warn!(error = %e, "Left click failed"),
            }
        }

        if reading.right_ear < EYE_AR_THRESHOLD
            && reading.left_ear >= EYE_AR_THRESHOLD
            && cooled_down(state.last_right_click, now, CLICK_COOLDOWN)
            && state.input_mode
        {
            state.last_right_click = Some(now);
            decision.click = Some(MouseButton::Right);
            match self.dispatcher.dispatch_click(MouseButton::Right) {
                Ok(action) => {
                    tracing::info!("Right click performed");
                    decision.actions.push(action);
                }
                Err(e) => tracing::warn!(error = %e, "Right click failed"),
            }
        }

        if self.state.input_mode {
            let dir = direction(
                reading.nose,
                self.state.anchor_point,
                MOVE_THRESHOLD_X,
                MOVE_THRESHOLD_Y,
            );
            decision.direction = Some(dir);
            match self.dispatcher.dispatch_movement(dir, self.state.scroll_mode) {
                Ok(Some(action)) => decision.actions.push(action),
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, direction = dir.as_str(), "Movement error"),
            }
        }

        decision
    }

    fn face_overlay(
        &self,
        face: &LandmarkSet,
        reading: &FaceReading,
        decision: &FaceDecision,
        width: u32,
        height: u32,
    ) -> Overlay {
        let w = width as i32;
        let mut overlay = Overlay::new();

        for p in face
            .mouth()
            .iter()
            .chain(face.left_eye())
            .chain(face.right_eye())
        {
            overlay.dot(*p, 2, GREEN);
        }

        let right_col = w - 200;
        overlay
            .text(Point::new(w - 240, 14), "EYE CONTROL MODE", 2, GREEN)
            .text(
                Point::new(right_col, 44),
                format!("LEFT EAR: {:.2}", reading.left_ear),
                2,
                BLUE,
            )
            .text(
                Point::new(right_col, 74),
                format!("RIGHT EAR: {:.2}", reading.right_ear),
                2,
                BLUE,
            )
            .text(
                Point::new(right_col, 104),
                format!("MAR: {:.2}", reading.mar),
                2,
                BLUE,
            )
            .dot(
                Point::new(w - 20, 21),
                10,
                if self.state.input_mode { GREEN } else { RED },
            )
            .dot(
                Point::new(w - 20, 51),
                10,
                if self.state.scroll_mode { GREEN } else { RED },
            );

        if self.state.input_mode {
            overlay
                .text(Point::new(10, 14), "INPUT MODE", 2, RED)
                .text(Point::new(10, 74), "CLOSE LEFT EYE: LEFT CLICK", 2, BLUE)
                .text(Point::new(10, 104), "CLOSE RIGHT EYE: RIGHT CLICK", 2, BLUE);
        }
        if self.state.scroll_mode {
            overlay.text(Point::new(10, 44), "SCROLL MODE", 2, RED);
        }

        if let Some(button) = decision.click {
            let (label, color) = match button {
                MouseButton::Left => ("LEFT CLICK!", RED),
                MouseButton::Right => ("RIGHT CLICK!", GREEN),
            };
            let x = w / 2 - font::text_width(label, 3) as i32 / 2;
            overlay.text(Point::new(x, height as i32 / 2), label, 3, color);
        }

        overlay
    }
}

impl Default for GestureController {
    fn default() -> Self {
        Self::new(ActionDispatcher::default())
    }
}
