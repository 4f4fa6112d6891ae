// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection model lifecycle: load once at startup, release on shutdown

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::RwLock;

use crate::vision::yolo::{
    select_device, Device, DetectionModel, DevicePreference, YoloOnnxModel, YoloOptions,
};

/// Configuration for loading the detection model
#[derive(Debug, Clone)]
pub struct DetectionModelConfig {
    /// Path to the exported ONNX weights
    pub model_path: PathBuf,
    /// Requested compute device
    pub device: DevicePreference,
    /// Session and postprocessing options
    pub options: YoloOptions,
}

impl Default for DetectionModelConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("./models/yolov5mu.onnx"),
            device: DevicePreference::Auto,
            options: YoloOptions::default(),
        }
    }
}

/// Owner of the process-lifetime detection model
///
/// Constructed in `main`, shared with handlers through router state. The model
/// itself is handed out as `Arc<dyn DetectionModel>` so in-flight requests keep
/// it alive even if `release` runs concurrently.
#[derive(Default)]
pub struct ModelManager {
    model: RwLock<Option<Arc<dyn DetectionModel>>>,
}

impl ModelManager {
    /// Create a manager with no model loaded
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager around an already constructed model
    pub fn with_model(model: Arc<dyn DetectionModel>) -> Self {
        Self {
            model: RwLock::new(Some(model)),
        }
    }

    /// Select a device, load the weights and install the model
    ///
    /// Loading runs on the blocking pool; ONNX session creation can take
    /// seconds for larger checkpoints.
    pub async fn load(&self, config: DetectionModelConfig) -> anyhow::Result<Device> {
        let device = select_device(config.device);
        tracing::info!("Selected compute device: {}", device);

        let path = config.model_path.clone();
        let model = tokio::task::spawn_blocking(move || {
            YoloOnnxModel::load(&config.model_path, device, config.options)
        })
        .await
        .context("Model loading task panicked")?
        .with_context(|| format!("Failed to load detection model from {}", path.display()))?;

        self.install(Arc::new(model)).await;
        Ok(device)
    }

    /// Install a model, replacing any previous one
    pub async fn install(&self, model: Arc<dyn DetectionModel>) {
        let device = model.device();
        *self.model.write().await = Some(model);
        tracing::info!("✅ Detection model installed on {}", device);
    }

    /// The loaded model, if any
    pub async fn current(&self) -> Option<Arc<dyn DetectionModel>> {
        self.model.read().await.clone()
    }

    /// Whether a model handle is present
    ///
    /// Says nothing about whether the model can actually run inference.
    pub async fn is_loaded(&self) -> bool {
        self.model.read().await.is_some()
    }

    /// Drop the manager's handle; returns whether one was present
    pub async fn release(&self) -> bool {
        let released = self.model.write().await.take().is_some();
        if released {
            tracing::info!("Detection model released");
        }
        released
    }
}
