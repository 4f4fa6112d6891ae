// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Decode, detect, format, render: the work behind both endpoints

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::debug;

use super::formatter::format_detections;
use super::response::{Detection, ImageSize};
use crate::vision::image_utils::{decode_base64_image, decode_image_bytes, encode_jpeg_base64};
use crate::vision::yolo::{DetectionModel, ModelError};
use crate::vision::ImageError;

/// Failures inside the detection pipeline, one variant per stage
#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("{0}")]
    Decode(ImageError),

    #[error("{0}")]
    Inference(#[from] ModelError),

    #[error("Unknown class id {0}")]
    UnknownClass(usize),

    #[error("{0}")]
    Encode(ImageError),

    #[error("Detection model is not loaded")]
    ModelUnavailable,

    #[error("Failed to read upload: {0}")]
    Upload(String),

    #[error("Detection worker failed: {0}")]
    Worker(String),
}

impl DetectionError {
    /// Pipeline stage the failure came from, for logs
    pub fn stage(&self) -> &'static str {
        match self {
            DetectionError::Decode(_) => "decode",
            DetectionError::Inference(_) => "inference",
            DetectionError::UnknownClass(_) => "format",
            DetectionError::Encode(_) => "encode",
            DetectionError::ModelUnavailable => "model",
            DetectionError::Upload(_) => "upload",
            DetectionError::Worker(_) => "worker",
        }
    }
}

/// Wire form of the submitted image
#[derive(Debug, Clone)]
pub enum ImageSource {
    Bytes(Vec<u8>),
    Base64(String),
}

/// Everything a handler needs to assemble a response
#[derive(Debug, Clone)]
pub struct DetectionOutput {
    pub detections: Vec<Detection>,
    pub result_image: String,
    /// Dimensions of the decoded input image
    pub image_size: ImageSize,
    pub processing_time_ms: u64,
}

/// Run the full pipeline synchronously
///
/// All-or-nothing: any stage failing discards the work of the earlier ones.
pub fn run_detection(
    model: &dyn DetectionModel,
    source: ImageSource,
    confidence: f32,
) -> Result<DetectionOutput, DetectionError> {
    let started = Instant::now();

    let (image, info) = match source {
        ImageSource::Bytes(bytes) => decode_image_bytes(&bytes),
        ImageSource::Base64(text) => decode_base64_image(&text),
    }
    .map_err(DetectionError::Decode)?;

    debug!(
        "Decoded image: {}x{}, {} bytes, format {:?}",
        info.width, info.height, info.size_bytes, info.format
    );

    let prediction = model.predict(&image, confidence)?;
    let detections = format_detections(&prediction)?;

    let annotated = model.plot(&prediction);
    let result_image = encode_jpeg_base64(&annotated).map_err(DetectionError::Encode)?;

    Ok(DetectionOutput {
        detections,
        result_image,
        image_size: ImageSize {
            width: info.width,
            height: info.height,
        },
        processing_time_ms: started.elapsed().as_millis() as u64,
    })
}

/// Run the pipeline on the blocking pool
///
/// The inference call holds one blocking worker until the model returns; there
/// is no timeout or cancellation.
pub async fn detect(
    model: Arc<dyn DetectionModel>,
    source: ImageSource,
    confidence: f32,
) -> Result<DetectionOutput, DetectionError> {
    tokio::task::spawn_blocking(move || run_detection(model.as_ref(), source, confidence))
        .await
        .map_err(|e| DetectionError::Worker(e.to_string()))?
}
