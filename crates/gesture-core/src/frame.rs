use image::{imageops, RgbImage};

use crate::landmarks::LandmarkSet;

/// 一帧图像及外部检测器在该帧上给出的人脸关键点
///
/// 关键点坐标与 `image` 的原始（未镜像）坐标一致。
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: RgbImage,
    pub faces: Vec<LandmarkSet>,
}

impl Frame {
    pub fn new(image: RgbImage, faces: Vec<LandmarkSet>) -> Self {
        Self { image, faces }
    }

    /// 黑色画布，用于只有关键点没有图像的调用方
    pub fn blank(width: u32, height: u32, faces: Vec<LandmarkSet>) -> Self {
        Self::new(RgbImage::new(width, height), faces)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// 水平镜像图像，并同步镜像所有关键点
    pub fn mirror(&mut self) {
        imageops::flip_horizontal_in_place(&mut self.image);
        let width = self.image.width();
        for face in &mut self.faces {
            *face = face.mirrored(width);
        }
    }
}
