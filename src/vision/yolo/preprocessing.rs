// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for YOLO detectors

use image::{imageops::FilterType, Rgb, RgbImage};
use ndarray::Array4;

/// Default square input size for exported YOLO models
pub const YOLO_INPUT_SIZE: u32 = 640;

/// Padding colour Ultralytics uses for letterboxing
pub const PAD_VALUE: u8 = 114;

/// Mapping between letterboxed tensor space and source pixel space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    /// Source-to-tensor scale factor
    pub scale: f32,
    /// Horizontal padding in tensor pixels
    pub pad_x: f32,
    /// Vertical padding in tensor pixels
    pub pad_y: f32,
    /// Source width in pixels
    pub source_width: u32,
    /// Source height in pixels
    pub source_height: u32,
}

impl Letterbox {
    /// Map an `[x1, y1, x2, y2]` box from tensor space back to the source
    /// image, clipped to its bounds
    pub fn to_source(&self, xyxy: [f32; 4]) -> [f32; 4] {
        let max_x = self.source_width as f32;
        let max_y = self.source_height as f32;
        [
            ((xyxy[0] - self.pad_x) / self.scale).clamp(0.0, max_x),
            ((xyxy[1] - self.pad_y) / self.scale).clamp(0.0, max_y),
            ((xyxy[2] - self.pad_x) / self.scale).clamp(0.0, max_x),
            ((xyxy[3] - self.pad_y) / self.scale).clamp(0.0, max_y),
        ]
    }
}

/// Preprocess an image for a YOLO detector
///
/// Steps:
/// 1. Resize keeping aspect ratio so the longer side equals `target_size`
/// 2. Pad to a `target_size` square, centring the content
/// 3. Scale pixels to [0, 1]
/// 4. Convert to NCHW tensor format [1, 3, H, W]
pub fn preprocess_for_yolo(image: &RgbImage, target_size: u32) -> (Array4<f32>, Letterbox) {
    let (padded, letterbox) = letterbox_resize(image, target_size);

    let size = target_size as usize;
    let mut tensor = Array4::zeros((1, 3, size, size));
    for (x, y, pixel) in padded.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
        }
    }

    (tensor, letterbox)
}

/// Resize with letterbox (padding, no distortion, keeps all content)
pub fn letterbox_resize(image: &RgbImage, target_size: u32) -> (RgbImage, Letterbox) {
    let (orig_w, orig_h) = image.dimensions();

    let scale_w = target_size as f32 / orig_w as f32;
    let scale_h = target_size as f32 / orig_h as f32;
    let scale = scale_w.min(scale_h);

    let new_w = ((orig_w as f32 * scale).round() as u32).clamp(1, target_size);
    let new_h = ((orig_h as f32 * scale).round() as u32).clamp(1, target_size);

    let resized = image::imageops::resize(image, new_w, new_h, FilterType::Triangle);

    let mut canvas = RgbImage::from_pixel(target_size, target_size, Rgb([PAD_VALUE; 3]));
    let offset_x = (target_size - new_w) / 2;
    let offset_y = (target_size - new_h) / 2;
    image::imageops::replace(&mut canvas, &resized, offset_x as i64, offset_y as i64);

    let letterbox = Letterbox {
        scale,
        pad_x: offset_x as f32,
        pad_y: offset_y as f32,
        source_width: orig_w,
        source_height: orig_h,
    };

    (canvas, letterbox)
}
