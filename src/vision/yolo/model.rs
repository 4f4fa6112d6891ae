// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection model handle and the values it hands back

use std::sync::Arc;

use image::RgbImage;
use thiserror::Error;

use super::device::Device;
use super::labels::ClassNames;
use super::plot;

/// Errors raised by a detection model
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model file not found: {0}")]
    NotFound(String),

    #[error("Failed to load model: {0}")]
    Load(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Unexpected model output shape {0:?}")]
    OutputShape(Vec<usize>),

    #[error("Image has zero width or height")]
    EmptyImage,
}

/// One region proposed by the model, in source-image pixel space
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    /// Index into the model's label mapping
    pub class_id: usize,
    /// Score in [0, 1]
    pub confidence: f32,
    /// `[x1, y1, x2, y2]`
    pub xyxy: [f32; 4],
}

impl RawDetection {
    pub fn area(&self) -> f32 {
        let [x1, y1, x2, y2] = self.xyxy;
        (x2 - x1).max(0.0) * (y2 - y1).max(0.0)
    }

    pub fn iou(&self, other: &RawDetection) -> f32 {
        let x1 = self.xyxy[0].max(other.xyxy[0]);
        let y1 = self.xyxy[1].max(other.xyxy[1]);
        let x2 = self.xyxy[2].min(other.xyxy[2]);
        let y2 = self.xyxy[3].min(other.xyxy[3]);

        let intersection = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
        let union = self.area() + other.area() - intersection;

        if union > 0.0 {
            intersection / union
        } else {
            0.0
        }
    }
}

/// Result of running the detector over one image
#[derive(Debug, Clone)]
pub struct Prediction {
    /// Regions in the order the model emitted them
    pub detections: Vec<RawDetection>,
    /// Label mapping for `class_id`
    pub names: Arc<ClassNames>,
    /// The image inference ran on, kept for rendering
    pub source: Arc<RgbImage>,
}

impl Prediction {
    pub fn new(detections: Vec<RawDetection>, names: Arc<ClassNames>, source: Arc<RgbImage>) -> Self {
        Self {
            detections,
            names,
            source,
        }
    }
}

/// Channel layout of an annotated buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    Rgb,
    Bgr,
}

/// Interleaved 8-bit, 3-channel pixels produced by a renderer
#[derive(Debug, Clone)]
pub struct AnnotatedImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
    order: ChannelOrder,
}

impl AnnotatedImage {
    pub fn new(buffer: RgbImage, order: ChannelOrder) -> Self {
        let (width, height) = buffer.dimensions();
        Self {
            width,
            height,
            data: buffer.into_raw(),
            order,
        }
    }

    /// Wrap a raw interleaved buffer. Length is checked when the image is encoded.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>, order: ChannelOrder) -> Self {
        Self {
            width,
            height,
            data,
            order,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn order(&self) -> ChannelOrder {
        self.order
    }
}

/// A loaded detection model bound to a compute device
///
/// Implementations are shared across requests behind an `Arc` and invoked from
/// blocking worker threads, so any interior state must be synchronised by the
/// implementation itself.
#[cfg_attr(test, mockall::automock)]
pub trait DetectionModel: Send + Sync {
    /// Run detection keeping regions scoring at least `confidence`
    fn predict(&self, image: &RgbImage, confidence: f32) -> Result<Prediction, ModelError>;

    /// Render the prediction's boxes over its source image
    fn plot(&self, prediction: &Prediction) -> AnnotatedImage {
        plot::draw_predictions(prediction)
    }

    /// Device the weights are bound to
    fn device(&self) -> Device;
}
