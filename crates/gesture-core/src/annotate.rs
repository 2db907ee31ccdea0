//! 帧叠加层
//!
//! 状态机把要画的内容描述为 [`Overlay`]，[`FrameAnnotator`] 负责落到像素上。
//! 叠加层只用于观察，不会反过来影响任何状态。

use image::{Rgb, RgbImage};

use crate::font::{self, GLYPH_HEIGHT, GLYPH_SPACING, GLYPH_WIDTH};
use crate::landmarks::Point;

pub const RED: Rgb<u8> = Rgb([255, 0, 0]);
pub const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
pub const BLUE: Rgb<u8> = Rgb([0, 0, 255]);

#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    /// 实心圆点
    Dot {
        at: Point,
        radius: i32,
        color: Rgb<u8>,
    },
    /// 点阵文字，`at` 为左上角
    Text {
        at: Point,
        text: String,
        scale: u32,
        color: Rgb<u8>,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    items: Vec<Annotation>,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dot(&mut self, at: Point, radius: i32, color: Rgb<u8>) -> &mut Self {
        self.items.push(Annotation::Dot { at, radius, color });
        self
    }

    pub fn text(&mut self, at: Point, text: impl Into<String>, scale: u32, color: Rgb<u8>) -> &mut Self {
        self.items.push(Annotation::Text {
            at,
            text: text.into(),
            scale,
            color,
        });
        self
    }

    pub fn extend(&mut self, other: Overlay) {
        self.items.extend(other.items);
    }

    pub fn items(&self) -> &[Annotation] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 是否包含指定文字，主要供测试断言使用
    pub fn has_text(&self, needle: &str) -> bool {
        self.items
            .iter()
            .any(|a| matches!(a, Annotation::Text { text, .. } if text == needle))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FrameAnnotator;

impl FrameAnnotator {
    pub fn draw(&self, image: &mut RgbImage, overlay: &Overlay) {
        for item in overlay.items() {
            match item {
                Annotation::Dot { at, radius, color } => fill_circle(image, *at, *radius, *color),
                Annotation::Text {
                    at,
                    text,
                    scale,
                    color,
                } => draw_text(image, *at, text, *scale, *color),
            }
        }
    }
}

fn put_clipped(image: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x < 0 || y < 0 || x >= i64::from(image.width()) || y >= i64::from(image.height()) {
        return;
    }
    image.put_pixel(x as u32, y as u32, color);
}

fn fill_circle(image: &mut RgbImage, center: Point, radius: i32, color: Rgb<u8>) {
    let r = i64::from(radius.max(0));
    let (cx, cy) = (i64::from(center.x), i64::from(center.y));
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy <= r * r {
                put_clipped(image, cx + dx, cy + dy, color);
            }
        }
    }
}

fn draw_text(image: &mut RgbImage, origin: Point, text: &str, scale: u32, color: Rgb<u8>) {
    let scale = i64::from(scale.max(1));
    let advance = i64::from(GLYPH_WIDTH + GLYPH_SPACING) * scale;
    let mut x0 = i64::from(origin.x);
    let y0 = i64::from(origin.y);

    for c in text.chars() {
        let rows = font::glyph(c);
        for (row, bits) in rows.iter().enumerate().take(GLYPH_HEIGHT as usize) {
            for col in 0..GLYPH_WIDTH {
                if (bits >> (GLYPH_WIDTH - 1 - col)) & 1 == 0 {
                    continue;
                }
                let px = x0 + i64::from(col) * scale;
                let py = y0 + row as i64 * scale;
                for sy in 0..scale {
                    for sx in 0..scale {
                        put_clipped(image, px + sx, py + sy, color);
                    }
                }
            }
        }
        x0 += advance;
    }
}
