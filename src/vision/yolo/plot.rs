// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Box and label overlay rendering
//!
//! Output is BGR, the ordering detection toolchains hand back from their
//! plotting helpers. Callers convert before encoding.

use ab_glyph::{FontRef, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use tracing::warn;

use super::model::{AnnotatedImage, ChannelOrder, Prediction, RawDetection};

/// DejaVu Sans, covers Latin, Greek and Cyrillic labels
static LABEL_FONT: &[u8] = include_bytes!("../../../assets/fonts/DejaVuSans.ttf");

/// Per-class colours, cycled by class id
const PALETTE: [[u8; 3]; 20] = [
    [0xFF, 0x38, 0x38], [0xFF, 0x9D, 0x97], [0xFF, 0x70, 0x1F], [0xFF, 0xB2, 0x1D],
    [0xCF, 0xD2, 0x31], [0x48, 0xF9, 0x0A], [0x92, 0xCC, 0x17], [0x3D, 0xDB, 0x86],
    [0x1A, 0x93, 0x34], [0x00, 0xD4, 0xBB], [0x2C, 0x99, 0xA8], [0x00, 0xC2, 0xFF],
    [0x34, 0x45, 0x93], [0x64, 0x73, 0xFF], [0x00, 0x18, 0xEC], [0x84, 0x38, 0xFF],
    [0x52, 0x00, 0x85], [0xCB, 0x38, 0xFF], [0xFF, 0x95, 0xC8], [0xFF, 0x37, 0xC7],
];

/// Colour assigned to a class id
pub fn class_color(class_id: usize) -> Rgb<u8> {
    Rgb(PALETTE[class_id % PALETTE.len()])
}

/// Stroke and font sizing derived from the image dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
struct Style {
    line_width: u32,
    font_size: f32,
}

impl Style {
    fn for_image(width: u32, height: u32) -> Self {
        let half_sum = (width + height) as f32 / 2.0;
        Self {
            line_width: ((half_sum * 0.003).round() as u32).max(2),
            font_size: (half_sum * 0.035).round().max(12.0),
        }
    }
}

/// Draw every detection of a prediction over a copy of its source image
pub fn draw_predictions(prediction: &Prediction) -> AnnotatedImage {
    let mut canvas: RgbImage = (*prediction.source).clone();
    let (w, h) = canvas.dimensions();
    let style = Style::for_image(w, h);

    let font = match FontRef::try_from_slice(LABEL_FONT) {
        Ok(font) => Some(font),
        Err(e) => {
            warn!("Label font unavailable, drawing boxes only: {}", e);
            None
        }
    };

    if w > 0 && h > 0 {
        for det in &prediction.detections {
            let label = match prediction.names.get(det.class_id) {
                Some(name) => format!("{} {:.2}", name, det.confidence),
                None => format!("{} {:.2}", det.class_id, det.confidence),
            };
            draw_detection(&mut canvas, det, &label, font.as_ref(), style);
        }
    }

    AnnotatedImage::new(swap_red_blue(canvas), ChannelOrder::Bgr)
}

fn draw_detection(
    canvas: &mut RgbImage,
    det: &RawDetection,
    label: &str,
    font: Option<&FontRef<'_>>,
    style: Style,
) {
    let color = class_color(det.class_id);
    let (w, h) = canvas.dimensions();

    let x1 = (det.xyxy[0].max(0.0) as u32).min(w - 1);
    let y1 = (det.xyxy[1].max(0.0) as u32).min(h - 1);
    let x2 = (det.xyxy[2].max(0.0) as u32).min(w - 1);
    let y2 = (det.xyxy[3].max(0.0) as u32).min(h - 1);
    let (x1, x2) = (x1.min(x2), x1.max(x2));
    let (y1, y2) = (y1.min(y2), y1.max(y2));

    // nested outlines, shrinking inward
    for t in 0..style.line_width {
        let (left, top) = (x1 + t, y1 + t);
        let (right, bottom) = (x2.saturating_sub(t), y2.saturating_sub(t));
        if right < left || bottom < top {
            break;
        }
        draw_hollow_rect_mut(
            canvas,
            Rect::at(left as i32, top as i32).of_size(right - left + 1, bottom - top + 1),
            color,
        );
    }

    let Some(font) = font else {
        return;
    };

    let scale = PxScale::from(style.font_size);
    let (text_w, text_h) = text_size(scale, font, label);
    let pad = style.line_width;
    let band_w = text_w + 2 * pad;
    let band_h = text_h + 2 * pad;

    // above the box when there is room, inside otherwise
    let band_top = if y1 >= band_h { y1 - band_h } else { y1 };
    draw_filled_rect_mut(
        canvas,
        Rect::at(x1 as i32, band_top as i32).of_size(band_w.max(1), band_h.max(1)),
        color,
    );
    draw_text_mut(
        canvas,
        text_color(color),
        (x1 + pad) as i32,
        (band_top + pad) as i32,
        scale,
        font,
        label,
    );
}

fn text_color(background: Rgb<u8>) -> Rgb<u8> {
    let [r, g, b] = background.0;
    let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    if luma > 160.0 {
        Rgb([0, 0, 0])
    } else {
        Rgb([255, 255, 255])
    }
}

fn swap_red_blue(mut image: RgbImage) -> RgbImage {
    for pixel in image.pixels_mut() {
        pixel.0.swap(0, 2);
    }
    image
}
