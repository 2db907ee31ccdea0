//! 会话：持有当前模式与两个处理组件
//!
//! 服务端只持有一个 [`Session`]，所有帧都经由它按模式分发。

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::controller::{GestureController, TickReport};
use crate::dispatcher::ActionDispatcher;
use crate::frame::Frame;
use crate::warning::{WarningConfig, WarningReport, WarningSystem};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    EyeControl,
    Warning,
    #[default]
    Idle,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::EyeControl => "eye_control",
            Mode::Warning => "warning",
            Mode::Idle => "idle",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mode: {0}")]
pub struct UnknownMode(pub String);

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "eye_control" => Ok(Mode::EyeControl),
            "warning" => Ok(Mode::Warning),
            "idle" | "none" => Ok(Mode::Idle),
            other => Err(UnknownMode(other.to_string())),
        }
    }
}

/// 推送给前端的会话事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    ModeUpdate {
        mode: Mode,
    },
    Warning {
        count: u64,
    },
    #[serde(rename_all = "camelCase")]
    ControlState {
        input_mode: bool,
        scroll_mode: bool,
    },
}

impl SessionEvent {
    /// SSE 事件名
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::ModeUpdate { .. } => "mode_update",
            SessionEvent::Warning { .. } => "warning",
            SessionEvent::ControlState { .. } => "control_state",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub mode: Mode,
    pub input_mode: bool,
    pub scroll_mode: bool,
    pub warning_count: u64,
}

#[derive(Debug, Clone, Default)]
pub struct SessionTick {
    pub control: Option<TickReport>,
    pub warning: Option<WarningReport>,
    pub events: Vec<SessionEvent>,
}

pub struct Session {
    mode: Mode,
    eye: GestureController,
    warning: WarningSystem,
}

impl Session {
    pub fn new(dispatcher: ActionDispatcher, warning: WarningConfig) -> Self {
        Self {
            mode: Mode::Idle,
            eye: GestureController::new(dispatcher),
            warning: WarningSystem::new(warning),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn controller(&self) -> &GestureController {
        &self.eye
    }

    pub fn warning_system(&self) -> &WarningSystem {
        &self.warning
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.eye.state();
        SessionSnapshot {
            mode: self.mode,
            input_mode: state.input_mode(),
            scroll_mode: state.scroll_mode(),
            warning_count: self.warning.warning_count(),
        }
    }

    /// 切换模式，模式未变化时返回 false 且不做任何事
    pub fn set_mode(&mut self, mode: Mode) -> bool {
        if mode == self.mode {
            return false;
        }
        match mode {
            Mode::EyeControl => {
                self.warning.reset();
                self.eye.activate();
                self.warning.deactivate();
            }
            Mode::Warning => {
                self.eye.deactivate();
                self.warning.activate();
            }
            Mode::Idle => {
                self.eye.deactivate();
                self.warning.deactivate();
            }
        }
        tracing::info!(from = %self.mode, to = %mode, "Mode changed");
        self.mode = mode;
        true
    }

    pub fn process_frame(&mut self, frame: &mut Frame, now: Instant) -> SessionTick {
        let mut tick = SessionTick::default();
        match self.mode {
            Mode::EyeControl => {
                let report = self.eye.process_frame(frame, now);
                if report.mode_changed() {
                    let state = self.eye.state();
                    tick.events.push(SessionEvent::ControlState {
                        input_mode: state.input_mode(),
                        scroll_mode: state.scroll_mode(),
                    });
                }
                tick.control = Some(report);
            }
            Mode::Warning => {
                let report = self.warning.process_frame(frame);
                if report.warning {
                    tick.events.push(SessionEvent::Warning {
                        count: report.warning_count,
                    });
                }
                tick.warning = Some(report);
            }
            Mode::Idle => {}
        }
        tick
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(ActionDispatcher::default(), WarningConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{LandmarkSet, Point};

    fn closed_eyes_face() -> LandmarkSet {
        // 双眼扁平（EAR 0.05），其余点重合（MAR 为 0）
        let mut pts = vec![Point::new(100, 100); 68];
        for (base, x0) in [(36usize, 60), (42usize, 120)] {
            pts[base] = Point::new(x0, 100);
            pts[base + 1] = Point::new(x0 + 13, 101);
            pts[base + 2] = Point::new(x0 + 26, 101);
            pts[base + 3] = Point::new(x0 + 40, 100);
            pts[base + 4] = Point::new(x0 + 26, 99);
            pts[base + 5] = Point::new(x0 + 13, 99);
        }
        LandmarkSet::try_from(pts).unwrap()
    }

    #[test]
    fn mode_parses_and_serializes() {
        assert_eq!("eye_control".parse::<Mode>().unwrap(), Mode::EyeControl);
        assert_eq!("none".parse::<Mode>().unwrap(), Mode::Idle);
        assert!("sleep".parse::<Mode>().is_err());
        assert_eq!(serde_json::to_string(&Mode::EyeControl).unwrap(), "\"eye_control\"");
    }

    #[test]
    fn event_serialization_uses_wire_names() {
        let ev = SessionEvent::ControlState {
            input_mode: true,
            scroll_mode: false,
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["type"], "control_state");
        assert_eq!(json["inputMode"], true);
        assert_eq!(ev.name(), "control_state");
    }

    #[test]
    fn same_mode_is_noop() {
        let mut s = Session::default();
        assert!(!s.set_mode(Mode::Idle));
        assert!(s.set_mode(Mode::EyeControl));
        assert!(!s.set_mode(Mode::EyeControl));
    }

    #[test]
    fn transitions_toggle_components() {
        let mut s = Session::default();
        s.set_mode(Mode::EyeControl);
        assert!(s.controller().is_active());
        assert!(!s.warning_system().is_active());

        s.set_mode(Mode::Warning);
        assert!(!s.controller().is_active());
        assert!(s.warning_system().is_active());

        s.set_mode(Mode::Idle);
        assert!(!s.controller().is_active());
        assert!(!s.warning_system().is_active());
    }

    #[test]
    fn warning_fires_event_and_eye_control_resets_count() {
        let mut s = Session::new(
            ActionDispatcher::default(),
            WarningConfig {
                ear_threshold: 0.25,
                consec_frames: 2,
            },
        );
        s.set_mode(Mode::Warning);
        let now = Instant::now();

        let mut events = Vec::new();
        for _ in 0..3 {
            let mut frame = Frame::blank(320, 240, vec![closed_eyes_face()]);
            events.extend(s.process_frame(&mut frame, now).events);
        }
        assert_eq!(events, vec![SessionEvent::Warning { count: 1 }]);
        assert_eq!(s.snapshot().warning_count, 1);

        s.set_mode(Mode::EyeControl);
        assert_eq!(s.snapshot().warning_count, 0);
    }

    #[test]
    fn blink_in_eye_control_emits_control_state() {
        let mut s = Session::default();
        s.set_mode(Mode::EyeControl);
        let mut frame = Frame::blank(320, 240, vec![closed_eyes_face()]);
        let tick = s.process_frame(&mut frame, Instant::now());

        assert_eq!(
            tick.events,
            vec![SessionEvent::ControlState {
                input_mode: false,
                scroll_mode: true
            }]
        );
        assert!(tick.control.is_some());
        assert!(tick.warning.is_none());
    }

    #[test]
    fn extreme_landmark_coordinates_are_processed() {
        let mut s = Session::default();
        s.set_mode(Mode::EyeControl);
        let mut pts = closed_eyes_face().points().to_vec();
        pts[36] = Point::new(i32::MIN, 100);
        pts[45] = Point::new(i32::MAX, i32::MIN);
        let face = LandmarkSet::try_from(pts).unwrap();

        let mut frame = Frame::blank(640, 480, vec![face]);
        let tick = s.process_frame(&mut frame, Instant::now());
        assert_eq!(tick.control.map(|c| c.faces.len()), Some(1));
    }

    #[test]
    fn idle_leaves_frame_untouched() {
        let mut s = Session::default();
        let mut frame = Frame::blank(8, 8, vec![closed_eyes_face()]);
        frame.image.put_pixel(0, 0, image::Rgb([1, 2, 3]));
        let tick = s.process_frame(&mut frame, Instant::now());
        assert!(tick.events.is_empty());
        assert_eq!(frame.image.get_pixel(0, 0), &image::Rgb([1, 2, 3]));
    }
}
