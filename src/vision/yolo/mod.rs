// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLO object detection via ONNX Runtime
//!
//! Components:
//! - `model` - `DetectionModel` trait and prediction types
//! - `engine` - ONNX Runtime implementation
//! - `preprocessing` - Letterboxing into NCHW tensors
//! - `postprocessing` - Output decoding and NMS
//! - `plot` - Annotated overlay rendering
//! - `labels` - Class id to label mapping
//! - `device` - CUDA/CPU selection

pub mod device;
pub mod engine;
pub mod labels;
pub mod model;
pub mod plot;
pub mod postprocessing;
pub mod preprocessing;

pub use device::{select_device, Device, DevicePreference};
pub use engine::{YoloOnnxModel, YoloOptions};
pub use labels::ClassNames;
pub use model::{AnnotatedImage, ChannelOrder, DetectionModel, ModelError, Prediction, RawDetection};
