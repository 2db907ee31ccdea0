//! 疲劳闭眼警告
//!
//! 双眼平均 EAR 连续 `consec_frames` 帧低于阈值时触发一次警告，
//! 同一次闭眼只计一次，睁眼后才会重新计数。警告总数单调递增，
//! 只有 [`WarningSystem::reset`] 会清零。

use serde::Serialize;

use crate::annotate::{FrameAnnotator, Overlay, BLUE, GREEN, RED};
use crate::ear::eye_aspect_ratio;
use crate::font;
use crate::frame::Frame;
use crate::landmarks::Point;

pub const DEFAULT_WARNING_EAR_THRESHOLD: f64 = 0.25;
pub const DEFAULT_WARNING_CONSEC_FRAMES: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WarningConfig {
    pub ear_threshold: f64,
    pub consec_frames: u32,
}

impl Default for WarningConfig {
    fn default() -> Self {
        Self {
            ear_threshold: DEFAULT_WARNING_EAR_THRESHOLD,
            consec_frames: DEFAULT_WARNING_CONSEC_FRAMES,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WarningReport {
    /// 本帧是否新触发了一次警告
    pub warning: bool,
    pub warning_count: u64,
    /// 每张人脸的双眼平均 EAR
    pub ears: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct WarningSystem {
    config: WarningConfig,
    active: bool,
    closed_frames: u32,
    alarm_on: bool,
    warning_count: u64,
    annotator: FrameAnnotator,
}

impl WarningSystem {
    pub fn new(config: WarningConfig) -> Self {
        Self {
            config,
            active: false,
            closed_frames: 0,
            alarm_on: false,
            warning_count: 0,
            annotator: FrameAnnotator,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn warning_count(&self) -> u64 {
        self.warning_count
    }

    pub fn alarm_on(&self) -> bool {
        self.alarm_on
    }

    pub fn activate(&mut self) {
        self.active = true;
        tracing::info!("Warning system activated");
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.closed_frames = 0;
        self.alarm_on = false;
        tracing::info!("Warning system deactivated");
    }

    pub fn reset(&mut self) {
        self.closed_frames = 0;
        self.alarm_on = false;
        self.warning_count = 0;
        tracing::debug!("Warning counters reset");
    }

    /// 单张人脸的平均 EAR 更新计数，返回是否新触发警告
    pub fn observe(&mut self, ear: f64) -> bool {
        if ear < self.config.ear_threshold {
            self.closed_frames = self.closed_frames.saturating_add(1);
            if self.closed_frames >= self.config.consec_frames && !self.alarm_on {
                self.alarm_on = true;
                self.warning_count += 1;
                tracing::warn!(
                    count = self.warning_count,
                    closed_frames = self.closed_frames,
                    "Drowsiness warning"
                );
                return true;
            }
        } else {
            self.closed_frames = 0;
            self.alarm_on = false;
        }
        false
    }

    pub fn process_frame(&mut self, frame: &mut Frame) -> WarningReport {
        let mut report = WarningReport {
            warning_count: self.warning_count,
            ..WarningReport::default()
        };
        if !self.active {
            return report;
        }

        frame.mirror();
        let mut overlay = Overlay::new();
        let w = frame.width() as i32;
        let h = frame.height() as i32;

        for face in &frame.faces {
            let left = eye_aspect_ratio(face.left_eye());
            let right = eye_aspect_ratio(face.right_eye());
            let ear = (left + right) / 2.0;
            report.warning |= self.observe(ear);
            report.ears.push(ear);

            for p in face.left_eye().iter().chain(face.right_eye()) {
                overlay.dot(*p, 2, GREEN);
            }
            overlay.text(Point::new(w - 200, 44), format!("EAR: {ear:.2}"), 2, BLUE);
        }

        overlay
            .text(Point::new(w - 200, 14), "WARNING MODE", 2, GREEN)
            .text(
                Point::new(10, 14),
                format!("WARNINGS: {}", self.warning_count),
                2,
                BLUE,
            );
        if self.alarm_on {
            let label = "DROWSINESS ALERT!";
            let x = w / 2 - font::text_width(label, 3) as i32 / 2;
            overlay.text(Point::new(x, h / 2), label, 3, RED);
        }

        self.annotator.draw(&mut frame.image, &overlay);
        report.warning_count = self.warning_count;
        report
    }
}

impl Default for WarningSystem {
    fn default() -> Self {
        Self::new(WarningConfig::default())
    }
}
