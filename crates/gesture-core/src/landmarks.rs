//! 68 点面部关键点
//!
//! 外部检测器每帧为每张人脸产出一组按 iBUG-68 约定排序的整数坐标。
//! 本模块只负责持有这些点并提供区域切片（嘴、左眼、右眼、鼻），
//! 不涉及检测本身。

use std::ops::Range;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 单张人脸关键点数量
pub const LANDMARK_COUNT: usize = 68;

const MOUTH: Range<usize> = 48..68;
const LEFT_EYE: Range<usize> = 42..48;
const RIGHT_EYE: Range<usize> = 36..42;
const NOSE: Range<usize> = 27..36;

/// 鼻尖在鼻部区域内的下标（即全局第 30 号点）
const NOSE_TIP_IN_REGION: usize = 3;

/// 水平镜像后左右对称点的下标映射
const MIRROR_INDEX: [usize; LANDMARK_COUNT] = [
    // jaw 0-16
    16, 15, 14, 13, 12, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1, 0,
    // brows 17-26
    26, 25, 24, 23, 22, 21, 20, 19, 18, 17,
    // nose bridge 27-30
    27, 28, 29, 30,
    // nostrils 31-35
    35, 34, 33, 32, 31,
    // eyes 36-47
    45, 44, 43, 42, 47, 46, 39, 38, 37, 36, 41, 40,
    // outer lips 48-59
    54, 53, 52, 51, 50, 49, 48, 59, 58, 57, 56, 55,
    // inner lips 60-67
    64, 63, 62, 61, 60, 67, 66, 65,
];

/// 像素坐标点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// 欧氏距离
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LandmarkError {
    #[error("expected 68 landmarks, got {0}")]
    WrongCount(usize),
}

/// 单帧单脸的关键点集合，构造后不可变
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandmarkSet {
    points: [Point; LANDMARK_COUNT],
}

impl LandmarkSet {
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn mouth(&self) -> &[Point] {
        &self.points[MOUTH]
    }

    pub fn left_eye(&self) -> &[Point] {
        &self.points[LEFT_EYE]
    }

    pub fn right_eye(&self) -> &[Point] {
        &self.points[RIGHT_EYE]
    }

    pub fn nose(&self) -> &[Point] {
        &self.points[NOSE]
    }

    pub fn nose_tip(&self) -> Point {
        self.nose()[NOSE_TIP_IN_REGION]
    }

    /// 返回检测器在水平翻转后的图像上应给出的关键点
    ///
    /// x 坐标映射为 `width - 1 - x`，同时交换左右对称点的下标，
    /// 使 "左眼" 始终指向画面左侧的那只眼睛。坐标不超出 i32 范围时，
    /// 连续调用两次得到原集合；超出的结果截断到 i32 边界。
    pub fn mirrored(&self, width: u32) -> Self {
        let right_edge = i64::from(width) - 1;
        let mut points = [Point::default(); LANDMARK_COUNT];
        for (dst, &src) in points.iter_mut().zip(MIRROR_INDEX.iter()) {
            let p = self.points[src];
            *dst = Point::new(saturate(right_edge - i64::from(p.x)), p.y);
        }
        Self { points }
    }
}

fn saturate(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

impl TryFrom<Vec<Point>> for LandmarkSet {
    type Error = LandmarkError;

    fn try_from(value: Vec<Point>) -> Result<Self, Self::Error> {
        let len = value.len();
        let points: [Point; LANDMARK_COUNT] =
            value.try_into().map_err(|_| LandmarkError::WrongCount(len))?;
        Ok(Self { points })
    }
}

impl TryFrom<&[(i32, i32)]> for LandmarkSet {
    type Error = LandmarkError;

    fn try_from(value: &[(i32, i32)]) -> Result<Self, Self::Error> {
        value
            .iter()
            .copied()
            .map(Point::from)
            .collect::<Vec<_>>()
            .try_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered() -> LandmarkSet {
        let pts: Vec<Point> = (0..LANDMARK_COUNT as i32)
            .map(|i| Point::new(i * 3, 100 + i))
            .collect();
        LandmarkSet::try_from(pts).unwrap()
    }

    #[test]
    fn rejects_wrong_count() {
        let err = LandmarkSet::try_from(vec![Point::default(); 67]).unwrap_err();
        assert_eq!(err, LandmarkError::WrongCount(67));
    }

    #[test]
    fn region_slices_have_expected_sizes() {
        let set = numbered();
        assert_eq!(set.mouth().len(), 20);
        assert_eq!(set.left_eye().len(), 6);
        assert_eq!(set.right_eye().len(), 6);
        assert_eq!(set.nose().len(), 9);
        assert_eq!(set.mouth()[0], Point::new(48 * 3, 148));
        assert_eq!(set.left_eye()[0], Point::new(42 * 3, 142));
        assert_eq!(set.right_eye()[0], Point::new(36 * 3, 136));
    }

    #[test]
    fn nose_tip_is_landmark_30() {
        assert_eq!(numbered().nose_tip(), Point::new(90, 130));
    }

    #[test]
    fn mirror_map_is_a_permutation() {
        let mut seen = [false; LANDMARK_COUNT];
        for &i in MIRROR_INDEX.iter() {
            assert!(!seen[i], "index {i} mapped twice");
            seen[i] = true;
        }
        for (i, &j) in MIRROR_INDEX.iter().enumerate() {
            assert_eq!(MIRROR_INDEX[j], i);
        }
    }

    #[test]
    fn mirrored_twice_is_identity() {
        let set = numbered();
        assert_eq!(set.mirrored(640).mirrored(640), set);
    }

    #[test]
    fn mirrored_swaps_eyes_and_flips_x() {
        let set = numbered();
        let m = set.mirrored(640);
        // 原右眼外眼角 36 翻转后成为左眼外眼角 45
        assert_eq!(m.points()[45], Point::new(639 - 36 * 3, 136));
        assert_eq!(m.nose_tip(), Point::new(639 - 90, 130));
    }

    #[test]
    fn mirrored_saturates_extreme_coordinates() {
        let mut pts = vec![Point::new(10, 10); LANDMARK_COUNT];
        pts[36] = Point::new(i32::MIN, 100);
        pts[45] = Point::new(i32::MAX, 100);
        let m = LandmarkSet::try_from(pts).unwrap().mirrored(640);

        assert_eq!(m.points()[45], Point::new(i32::MAX, 100));
        assert_eq!(m.points()[36], Point::new(639 - i32::MAX, 100));
    }

    #[test]
    fn distance_spans_full_i32_range() {
        let d = Point::new(i32::MIN, 0).distance(&Point::new(i32::MAX, 0));
        assert_eq!(d, f64::from(i32::MAX) - f64::from(i32::MIN));
    }
}
