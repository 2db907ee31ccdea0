//! 指针动作分发
//!
//! 状态机只产生 [`PointerAction`]，真正的系统输入注入由 [`PointerSink`]
//! 完成。测试中可替换为 [`RecordingSink`]。

use std::sync::{Arc, Mutex};

use serde::Serialize;
use thiserror::Error;

use crate::direction::Direction;

/// 左右移动的固定步长（像素）
pub const MOVE_STEP: i32 = 10;
/// 滚动模式下的固定滚动量，正值向上
pub const SCROLL_STEP: i32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PointerAction {
    MoveBy { dx: i32, dy: i32 },
    Scroll { amount: i32 },
    Click { button: MouseButton },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("pointer backend unavailable: {0}")]
    Unavailable(String),
    #[error("pointer injection failed: {0}")]
    Injection(String),
}

/// 外部指针注入能力
pub trait PointerSink: Send {
    fn perform(&mut self, action: PointerAction) -> Result<(), DispatchError>;
}

/// 把方向意图映射为指针动作；`Direction::None` 不产生动作
pub fn movement_action(direction: Direction, scroll_mode: bool) -> Option<PointerAction> {
    match direction {
        Direction::Right => Some(PointerAction::MoveBy {
            dx: MOVE_STEP,
            dy: 0,
        }),
        Direction::Left => Some(PointerAction::MoveBy {
            dx: -MOVE_STEP,
            dy: 0,
        }),
        Direction::Up if scroll_mode => Some(PointerAction::Scroll {
            amount: SCROLL_STEP,
        }),
        Direction::Up => Some(PointerAction::MoveBy {
            dx: 0,
            dy: -MOVE_STEP,
        }),
        Direction::Down if scroll_mode => Some(PointerAction::Scroll {
            amount: -SCROLL_STEP,
        }),
        Direction::Down => Some(PointerAction::MoveBy {
            dx: 0,
            dy: MOVE_STEP,
        }),
        Direction::None => None,
    }
}

pub struct ActionDispatcher {
    sink: Box<dyn PointerSink>,
}

impl ActionDispatcher {
    pub fn new(sink: Box<dyn PointerSink>) -> Self {
        Self { sink }
    }

    /// 分发移动/滚动意图，返回实际执行的动作
    pub fn dispatch_movement(
        &mut self,
        direction: Direction,
        scroll_mode: bool,
    ) -> Result<Option<PointerAction>, DispatchError> {
        match movement_action(direction, scroll_mode) {
            Some(action) => self.sink.perform(action).map(|()| Some(action)),
            None => Ok(None),
        }
    }

    pub fn dispatch_click(&mut self, button: MouseButton) -> Result<PointerAction, DispatchError> {
        let action = PointerAction::Click { button };
        self.sink.perform(action).map(|()| action)
    }
}

impl Default for ActionDispatcher {
    fn default() -> Self {
        Self::new(Box::new(NoopSink))
    }
}

/// 丢弃所有动作
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl PointerSink for NoopSink {
    fn perform(&mut self, _action: PointerAction) -> Result<(), DispatchError> {
        Ok(())
    }
}

/// 只记录日志，不注入系统输入
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl PointerSink for LogSink {
    fn perform(&mut self, action: PointerAction) -> Result<(), DispatchError> {
        tracing::info!(?action, "Pointer action");
        Ok(())
    }
}

/// 记录所有动作，克隆体共享同一份记录
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    actions: Arc<Mutex<Vec<PointerAction>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actions(&self) -> Vec<PointerAction> {
        self.actions
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn clicks(&self, button: MouseButton) -> usize {
        self.actions()
            .iter()
            .filter(|a| matches!(a, PointerAction::Click { button: b } if *b == button))
            .count()
    }
}

impl PointerSink for RecordingSink {
    fn perform(&mut self, action: PointerAction) -> Result<(), DispatchError> {
        match self.actions.lock() {
            Ok(mut guard) => guard.push(action),
            Err(poisoned) => poisoned.into_inner().push(action),
        }
        Ok(())
    }
}
