//! 鼻尖相对锚点的位移方向分类

use serde::{Deserialize, Serialize};

use crate::landmarks::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
    None,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
            Self::None => "none",
        }
    }
}

/// 将 `current - anchor` 的位移分类为五个方向之一
///
/// 水平位移超过 `horizontal` 时优先判定左右；否则再看垂直位移是否超过
/// `vertical`。比较均为严格不等。图像坐标 y 轴向下，所以 y 减小为 `Up`。
pub fn direction(current: Point, anchor: Point, horizontal: i32, vertical: i32) -> Direction {
    // i64 下相减不会溢出
    let dx = i64::from(current.x) - i64::from(anchor.x);
    let dy = i64::from(current.y) - i64::from(anchor.y);
    let (h, v) = (i64::from(horizontal), i64::from(vertical));

    if dx > h {
        Direction::Right
    } else if dx < -h {
        Direction::Left
    } else if dy > v {
        Direction::Down
    } else if dy < -v {
        Direction::Up
    } else {
        Direction::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANCHOR: Point = Point::new(320, 240);

    fn offset(dx: i32, dy: i32) -> Direction {
        direction(Point::new(ANCHOR.x + dx, ANCHOR.y + dy), ANCHOR, 30, 15)
    }

    #[test]
    fn zero_offset_is_none() {
        assert_eq!(offset(0, 0), Direction::None);
    }

    #[test]
    fn thresholds_are_strict() {
        assert_eq!(offset(30, 0), Direction::None);
        assert_eq!(offset(31, 0), Direction::Right);
        assert_eq!(offset(-31, 0), Direction::Left);
        assert_eq!(offset(0, 15), Direction::None);
        assert_eq!(offset(0, 16), Direction::Down);
        assert_eq!(offset(0, -16), Direction::Up);
    }

    #[test]
    fn horizontal_wins_ties() {
        assert_eq!(offset(40, 20), Direction::Right);
        assert_eq!(offset(40, -20), Direction::Right);
        assert_eq!(offset(-40, 20), Direction::Left);
    }

    #[test]
    fn nose_up_is_up() {
        assert_eq!(offset(0, -20), Direction::Up);
    }

    #[test]
    fn extreme_offsets_do_not_overflow() {
        let far_left = Point::new(i32::MIN, 0);
        let far_right = Point::new(i32::MAX, 0);
        assert_eq!(direction(far_right, far_left, 30, 15), Direction::Right);
        assert_eq!(direction(far_left, far_right, 30, 15), Direction::Left);
        assert_eq!(
            direction(Point::new(0, i32::MIN), Point::new(0, i32::MAX), i32::MAX, i32::MAX),
            Direction::Up
        );
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&Direction::Up).unwrap();
        assert_eq!(json, "\"up\"");
    }
}
