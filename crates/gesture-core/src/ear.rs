//! EAR (Eye Aspect Ratio) 计算模块
//!
//! 标准6点公式: EAR = (|p2-p6| + |p3-p5|) / (2 * |p1-p4|)
//! - p1, p4: 眼角点（水平方向）
//! - p2, p3: 上眼睑点
//! - p5, p6: 下眼睑点
//!
//! EAR 越小眼睛越闭合。

use thiserror::Error;

use crate::landmarks::Point;

/// 眼部轮廓水平宽度为零时返回的哨兵值，按 "睁眼" 处理
pub const DEGENERATE_EAR: f64 = 1000.0;

const MIN_HORIZONTAL: f64 = 1e-6;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GeometryError {
    #[error("contour has zero horizontal extent")]
    DegenerateGeometry,
    #[error("expected at least {expected} points, got {actual}")]
    NotEnoughPoints { expected: usize, actual: usize },
}

/// 标准6点 EAR，退化几何返回错误
pub fn try_eye_aspect_ratio(eye: &[Point]) -> Result<f64, GeometryError> {
    let [p1, p2, p3, p4, p5, p6] = match eye {
        [a, b, c, d, e, f, ..] => [a, b, c, d, e, f],
        _ => {
            return Err(GeometryError::NotEnoughPoints {
                expected: 6,
                actual: eye.len(),
            })
        }
    };

    let horizontal = p1.distance(p4);
    if horizontal < MIN_HORIZONTAL {
        return Err(GeometryError::DegenerateGeometry);
    }

    let vertical1 = p2.distance(p6);
    let vertical2 = p3.distance(p5);
    Ok((vertical1 + vertical2) / (2.0 * horizontal))
}

/// 标准6点 EAR
///
/// 退化几何（p1 == p4）或点数不足时返回 [`DEGENERATE_EAR`]，
/// 调用方无需额外判断即可与阈值比较。
pub fn eye_aspect_ratio(eye: &[Point]) -> f64 {
    try_eye_aspect_ratio(eye).unwrap_or(DEGENERATE_EAR)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 宽 40 像素、半高 h 的眼部轮廓，EAR = h / 20
    fn eye(h: i32) -> [Point; 6] {
        [
            Point::new(0, 0),
            Point::new(13, -h),
            Point::new(27, -h),
            Point::new(40, 0),
            Point::new(27, h),
            Point::new(13, h),
        ]
    }

    #[test]
    fn open_eye_ratio() {
        let ear = eye_aspect_ratio(&eye(6));
        assert!((ear - 0.3).abs() < 1e-9);
    }

    #[test]
    fn closed_eye_ratio() {
        let ear = eye_aspect_ratio(&eye(2));
        assert!((ear - 0.1).abs() < 1e-9);
    }

    #[test]
    fn degenerate_eye_returns_sentinel() {
        let mut pts = eye(4);
        pts[3] = pts[0];
        assert_eq!(eye_aspect_ratio(&pts), DEGENERATE_EAR);
        assert_eq!(
            try_eye_aspect_ratio(&pts),
            Err(GeometryError::DegenerateGeometry)
        );
    }

    #[test]
    fn short_contour_is_rejected() {
        let pts = eye(4);
        assert_eq!(
            try_eye_aspect_ratio(&pts[..5]),
            Err(GeometryError::NotEnoughPoints {
                expected: 6,
                actual: 5
            })
        );
        assert_eq!(eye_aspect_ratio(&pts[..5]), DEGENERATE_EAR);
    }
}
