// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Validated node configuration

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::api::RouterConfig;
use crate::vision::{DetectionModelConfig, DevicePreference, YoloOptions};

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid bind address '{0}'")]
    InvalidAddress(String),

    #[error("Invalid device: {0}")]
    InvalidDevice(String),

    #[error("Model input size must be a positive multiple of 32, got {0}")]
    InvalidInputSize(u32),

    #[error("IoU threshold must be within [0, 1], got {0}")]
    InvalidIouThreshold(f32),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Everything the node needs to start serving
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub addr: SocketAddr,
    pub model_path: PathBuf,
    pub device: DevicePreference,
    pub input_size: u32,
    pub iou_threshold: f32,
    pub max_detections: usize,
    pub max_upload_bytes: usize,
    pub intra_threads: usize,
}

impl NodeConfig {
    /// Validate raw settings into a config
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        host: &str,
        port: u16,
        model_path: PathBuf,
        device: &str,
        input_size: u32,
        iou_threshold: f32,
        max_detections: usize,
        max_upload_bytes: usize,
        intra_threads: usize,
    ) -> Result<Self, ConfigError> {
        let addr = format!("{}:{}", host, port)
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidAddress(format!("{}:{}", host, port)))?;
        let device = device
            .parse::<DevicePreference>()
            .map_err(ConfigError::InvalidDevice)?;

        let config = Self {
            addr,
            model_path,
            device,
            input_size,
            iou_threshold,
            max_detections,
            max_upload_bytes,
            intra_threads,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input_size == 0 || self.input_size % 32 != 0 {
            return Err(ConfigError::InvalidInputSize(self.input_size));
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(ConfigError::InvalidIouThreshold(self.iou_threshold));
        }
        if self.max_detections == 0 {
            return Err(ConfigError::Zero("max_detections"));
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Zero("max_upload_bytes"));
        }
        if self.intra_threads == 0 {
            return Err(ConfigError::Zero("intra_threads"));
        }
        Ok(())
    }

    pub fn model_config(&self) -> DetectionModelConfig {
        DetectionModelConfig {
            model_path: self.model_path.clone(),
            device: self.device,
            options: YoloOptions {
                input_size: self.input_size,
                iou_threshold: self.iou_threshold,
                max_detections: self.max_detections,
                intra_threads: self.intra_threads,
            },
        }
    }

    pub fn router_config(&self) -> RouterConfig {
        RouterConfig {
            max_upload_bytes: self.max_upload_bytes,
        }
    }
}
