// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Base64 detection request types and validation

use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;

/// Confidence threshold used when the client supplies none, and always for uploads
pub const DEFAULT_CONFIDENCE: f32 = 0.5;

fn default_confidence() -> Option<f32> {
    Some(DEFAULT_CONFIDENCE)
}

/// Request for detection on a base64-encoded image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Base64ImageRequest {
    /// Base64-encoded image data
    #[serde(default)]
    pub image: Option<String>,

    /// Minimum score for a region to be reported
    #[serde(default = "default_confidence")]
    pub confidence: Option<f32>,
}

impl Base64ImageRequest {
    /// Return the image payload, rejecting absent or empty values
    pub fn validate(&self) -> Result<&str, ApiError> {
        match self.image.as_deref() {
            Some(image) if !image.is_empty() => Ok(image),
            _ => Err(ApiError::image_required()),
        }
    }

    /// Threshold to run the model with; an explicit `null` means the default
    pub fn confidence(&self) -> f32 {
        self.confidence.unwrap_or(DEFAULT_CONFIDENCE)
    }
}
