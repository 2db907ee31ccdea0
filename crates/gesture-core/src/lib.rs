//! 面部手势鼠标控制核心库
//!
//! 输入为一帧图像和外部检测器给出的 68 点人脸关键点，输出为指针动作、
//! 模式事件以及绘制在图像上的叠加层。本库不做任何 I/O。
//!
//! ## 模块
//! - `landmarks`: 68 点关键点集合与区域切片
//! - `ear` / `mouth`: 眼部与嘴部纵横比 (EAR / MAR)
//! - `direction`: 鼻尖相对锚点的方向判定
//! - `controller`: 手势状态机
//! - `dispatcher`: 指针动作分发与 `PointerSink`
//! - `annotate` / `font`: 叠加层绘制
//! - `warning`: 闭眼疲劳警告
//! - `session`: 模式切换与按模式分发帧

pub mod annotate;
pub mod controller;
pub mod direction;
pub mod dispatcher;
pub mod ear;
pub mod font;
pub mod frame;
pub mod landmarks;
pub mod mouth;
pub mod session;
pub mod warning;

// 重新导出核心类型，方便外部使用
pub use annotate::{FrameAnnotator, Overlay};
pub use controller::{FaceReading, GestureController, GestureState, TickReport};
pub use direction::{direction, Direction};
pub use dispatcher::{
    ActionDispatcher, DispatchError, LogSink, MouseButton, NoopSink, PointerAction, PointerSink,
    RecordingSink,
};
pub use ear::{eye_aspect_ratio, GeometryError};
pub use frame::Frame;
pub use landmarks::{LandmarkError, LandmarkSet, Point};
pub use mouth::mouth_aspect_ratio;
pub use session::{Mode, Session, SessionEvent, SessionSnapshot, SessionTick};
pub use warning::{WarningConfig, WarningReport, WarningSystem};
