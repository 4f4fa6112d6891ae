// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! ONNX Runtime YOLO detector

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use anyhow::Context;
use image::RgbImage;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use tracing::{debug, info};

use super::device::Device;
use super::labels::ClassNames;
use super::model::{DetectionModel, ModelError, Prediction};
use super::postprocessing::{decode_output, PostprocessConfig};
use super::preprocessing::{preprocess_for_yolo, YOLO_INPUT_SIZE};

/// Options applied when building the session
#[derive(Debug, Clone)]
pub struct YoloOptions {
    /// Square input size the model was exported with
    pub input_size: u32,
    /// Overlap above which same-class boxes are merged
    pub iou_threshold: f32,
    /// Cap on returned regions
    pub max_detections: usize,
    /// ONNX Runtime intra-op threads
    pub intra_threads: usize,
}

impl Default for YoloOptions {
    fn default() -> Self {
        Self {
            input_size: YOLO_INPUT_SIZE,
            iou_threshold: 0.7,
            max_detections: 300,
            intra_threads: 4,
        }
    }
}

/// YOLO detector exported to ONNX (`yolo export format=onnx`)
pub struct YoloOnnxModel {
    /// ONNX Runtime session (runs need exclusive access)
    session: Mutex<Session>,
    input_name: String,
    names: Arc<ClassNames>,
    device: Device,
    options: YoloOptions,
}

impl std::fmt::Debug for YoloOnnxModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloOnnxModel")
            .field("input_name", &self.input_name)
            .field("classes", &self.names.len())
            .field("device", &self.device)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl YoloOnnxModel {
    /// Load the detector from an ONNX file and bind it to `device`
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found
    /// - ONNX Runtime initialization fails
    pub fn load<P: AsRef<Path>>(
        model_path: P,
        device: Device,
        options: YoloOptions,
    ) -> Result<Self, ModelError> {
        let model_path = model_path.as_ref();
        if !model_path.exists() {
            return Err(ModelError::NotFound(model_path.display().to_string()));
        }

        info!(
            "Loading YOLO model from {} on {}",
            model_path.display(),
            device
        );

        let session = build_session(model_path, device, options.intra_threads)
            .map_err(|e| ModelError::Load(format!("{:#}", e)))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());

        let names = session
            .metadata()
            .ok()
            .and_then(|meta| meta.custom("names").ok().flatten())
            .and_then(|raw| ClassNames::from_metadata(&raw))
            .unwrap_or_else(|| {
                debug!("No usable names metadata, using COCO labels");
                ClassNames::coco()
            });

        info!(
            "✅ YOLO model loaded: input '{}', {} classes, device {}",
            input_name,
            names.len(),
            device
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            names: Arc::new(names),
            device,
            options,
        })
    }
}

fn build_session(model_path: &Path, device: Device, intra_threads: usize) -> anyhow::Result<Session> {
    let session = Session::builder()
        .context("Failed to create session builder")?
        .with_execution_providers(device.execution_providers())
        .context("Failed to set execution providers")?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .context("Failed to set optimization level")?
        .with_intra_threads(intra_threads)
        .context("Failed to set intra threads")?
        .commit_from_file(model_path)
        .context(format!(
            "Failed to load YOLO model from {}",
            model_path.display()
        ))?;
    Ok(session)
}

impl DetectionModel for YoloOnnxModel {
    fn predict(&self, image: &RgbImage, confidence: f32) -> Result<Prediction, ModelError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(ModelError::EmptyImage);
        }

        let started = Instant::now();
        let (input, letterbox) = preprocess_for_yolo(image, self.options.input_size);
        let input_value = Value::from_array(input)
            .map_err(|e| ModelError::Inference(format!("failed to create input tensor: {}", e)))?;

        let config = PostprocessConfig {
            confidence_threshold: confidence,
            iou_threshold: self.options.iou_threshold,
            max_detections: self.options.max_detections,
        };

        let detections = {
            let mut session = self
                .session
                .lock()
                .map_err(|_| ModelError::Inference("session lock poisoned".to_string()))?;

            let outputs = session
                .run(ort::inputs![&self.input_name => input_value])
                .map_err(|e| ModelError::Inference(e.to_string()))?;

            let output = outputs[0]
                .try_extract_array::<f32>()
                .map_err(|e| ModelError::Inference(format!("failed to extract output: {}", e)))?;

            debug!("Detection output shape: {:?}", output.shape());
            decode_output(output, self.names.len(), &letterbox, &config)?
        };

        debug!(
            "Detected {} objects in {}ms",
            detections.len(),
            started.elapsed().as_millis()
        );

        Ok(Prediction::new(
            detections,
            self.names.clone(),
            Arc::new(image.clone()),
        ))
    }

    fn device(&self) -> Device {
        self.device
    }
}
