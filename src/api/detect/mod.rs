// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection endpoint module
//!
//! Provides POST /detect (multipart upload) and POST /detect_base64 (JSON).

pub mod formatter;
pub mod handler;
pub mod pipeline;
pub mod request;
pub mod response;

pub use handler::{detect_base64_handler, detect_handler};
pub use pipeline::{run_detection, DetectionError, DetectionOutput, ImageSource};
pub use request::{Base64ImageRequest, DEFAULT_CONFIDENCE};
pub use response::{BoundingBox, Detection, DetectionResponse, ImageSize};
