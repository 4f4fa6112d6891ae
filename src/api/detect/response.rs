// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection response types

use serde::{Deserialize, Serialize};

/// Axis-aligned box in source-image pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// One recognised object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Label resolved from the model's class mapping
    pub class_name: String,
    /// Score rounded to 3 decimals
    pub confidence: f64,
    /// Coordinates rounded to 2 decimals
    pub bbox: BoundingBox,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// Response from either detection endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionResponse {
    pub detections: Vec<Detection>,
    /// Always `detections.len()`
    pub total_objects: usize,
    /// Annotated image, base64 JPEG
    pub result_image: String,
    /// Only present on the upload path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_size: Option<ImageSize>,
}

impl DetectionResponse {
    pub fn new(detections: Vec<Detection>, result_image: String) -> Self {
        Self {
            total_objects: detections.len(),
            detections,
            result_image,
            image_size: None,
        }
    }

    pub fn with_image_size(mut self, image_size: ImageSize) -> Self {
        self.image_size = Some(image_size);
        self
    }
}
