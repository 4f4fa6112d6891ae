// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use clap::Parser;
use std::path::PathBuf;

use crate::config::{ConfigError, NodeConfig};

/// YOLO Object Detection Node
#[derive(Parser, Debug)]
#[command(name = "yolo-detect-node")]
#[command(version)]
#[command(about = "HTTP API for YOLO object detection", long_about = None)]
pub struct Cli {
    /// Host to bind
    #[arg(long, env = "API_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind
    #[arg(long, env = "API_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Path to the ONNX detector weights
    #[arg(long, env = "MODEL_PATH", default_value = "./models/yolov5mu.onnx")]
    pub model_path: PathBuf,

    /// Compute device (auto/cpu/cuda)
    #[arg(long, env = "DEVICE", default_value = "auto")]
    pub device: String,

    /// Square input size the weights were exported with
    #[arg(long, env = "MODEL_INPUT_SIZE", default_value_t = 640)]
    pub input_size: u32,

    /// NMS overlap threshold
    #[arg(long, env = "IOU_THRESHOLD", default_value_t = 0.7)]
    pub iou_threshold: f32,

    /// Maximum detections kept per image
    #[arg(long, env = "MAX_DETECTIONS", default_value_t = 300)]
    pub max_detections: usize,

    /// Request body limit in bytes
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = 20 * 1024 * 1024)]
    pub max_upload_bytes: usize,

    /// ONNX Runtime intra-op threads
    #[arg(long, env = "ORT_INTRA_THREADS", default_value_t = 4)]
    pub intra_threads: usize,
}

impl Cli {
    pub fn into_config(self) -> Result<NodeConfig, ConfigError> {
        NodeConfig::build(
            &self.host,
            self.port,
            self.model_path,
            &self.device,
            self.input_size,
            self.iou_threshold,
            self.max_detections,
            self.max_upload_bytes,
            self.intra_threads,
        )
    }
}
