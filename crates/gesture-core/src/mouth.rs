//! MAR (Mouth Aspect Ratio) 计算模块
//!
//! 使用 20 点嘴部轮廓（全局 48-67）中的内唇 8 点：
//! MAR = (|m13-m19| + |m14-m18| + |m15-m17|) / (2 * |m12-m16|)
//! - m12, m16: 内唇左右嘴角
//! - m13..m15: 上内唇
//! - m17..m19: 下内唇
//!
//! MAR 越大嘴张得越开。

use crate::ear::GeometryError;
use crate::landmarks::Point;

const MOUTH_POINTS: usize = 20;

const VERTICAL_PAIRS: [(usize, usize); 3] = [(13, 19), (14, 18), (15, 17)];
const HORIZONTAL_PAIR: (usize, usize) = (12, 16);

pub fn try_mouth_aspect_ratio(mouth: &[Point]) -> Result<f64, GeometryError> {
    if mouth.len() < MOUTH_POINTS {
        return Err(GeometryError::NotEnoughPoints {
            expected: MOUTH_POINTS,
            actual: mouth.len(),
        });
    }

    let (left, right) = HORIZONTAL_PAIR;
    let horizontal = mouth[left].distance(&mouth[right]);
    if horizontal < 1e-6 {
        return Err(GeometryError::DegenerateGeometry);
    }

    let vertical: f64 = VERTICAL_PAIRS
        .iter()
        .map(|&(upper, lower)| mouth[upper].distance(&mouth[lower]))
        .sum();

    Ok(vertical / (2.0 * horizontal))
}

/// 计算 MAR；退化或点数不足时返回 0.0（视为闭嘴）
pub fn mouth_aspect_ratio(mouth: &[Point]) -> f64 {
    try_mouth_aspect_ratio(mouth).unwrap_or(0.0)
}
