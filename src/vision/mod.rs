// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing module
//!
//! This module provides:
//! - Image decoding/encoding for the HTTP surface
//! - YOLO object detection via ONNX Runtime
//! - The model manager owning the loaded detector

pub mod image_utils;
pub mod model_manager;
pub mod yolo;

pub use image_utils::{decode_base64_image, decode_image_bytes, encode_jpeg_base64, ImageError, ImageInfo};
pub use model_manager::{DetectionModelConfig, ModelManager};
pub use yolo::{DetectionModel, Device, DevicePreference, YoloOptions};
