// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Raw model output to the public detection shape

use super::pipeline::DetectionError;
use super::response::{BoundingBox, Detection};
use crate::vision::yolo::{Prediction, RawDetection};

/// Decimal places kept for confidence scores
pub const CONFIDENCE_DECIMALS: i32 = 3;

/// Decimal places kept for box coordinates
pub const COORDINATE_DECIMALS: i32 = 2;

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Format every region of a prediction, preserving model order
pub fn format_detections(prediction: &Prediction) -> Result<Vec<Detection>, DetectionError> {
    prediction
        .detections
        .iter()
        .map(|raw| format_detection(prediction, raw))
        .collect()
}

fn format_detection(prediction: &Prediction, raw: &RawDetection) -> Result<Detection, DetectionError> {
    let class_name = prediction
        .names
        .get(raw.class_id)
        .ok_or(DetectionError::UnknownClass(raw.class_id))?;

    let [x1, y1, x2, y2] = raw.xyxy.map(|v| round_to(v as f64, COORDINATE_DECIMALS));

    Ok(Detection {
        class_name: class_name.to_string(),
        confidence: round_to(raw.confidence as f64, CONFIDENCE_DECIMALS),
        bbox: BoundingBox { x1, y1, x2, y2 },
    })
}
