// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Model manager lifecycle tests

use std::path::PathBuf;
use std::sync::Arc;

use image::RgbImage;
use yolo_detect_node::vision::{
    yolo::{ClassNames, Device, DetectionModel, ModelError, Prediction},
    DetectionModelConfig, DevicePreference, ModelManager, YoloOptions,
};

const MODEL_PATH: &str = "./models/yolov5mu.onnx";

struct EmptyModel;

impl DetectionModel for EmptyModel {
    fn predict(&self, image: &RgbImage, _confidence: f32) -> Result<Prediction, ModelError> {
        Ok(Prediction::new(
            Vec::new(),
            Arc::new(ClassNames::coco()),
            Arc::new(image.clone()),
        ))
    }

    fn device(&self) -> Device {
        Device::Cpu
    }
}

#[tokio::test]
async fn test_install_and_release() {
    let manager = ModelManager::new();
    assert!(!manager.is_loaded().await);

    manager.install(Arc::new(EmptyModel)).await;
    assert!(manager.is_loaded().await);
    assert_eq!(manager.current().await.unwrap().device(), Device::Cpu);

    assert!(manager.release().await);
    assert!(manager.current().await.is_none());
}

#[tokio::test]
async fn test_missing_weights_fail_to_load() {
    let manager = ModelManager::new();
    let result = manager
        .load(DetectionModelConfig {
            model_path: PathBuf::from("/nonexistent/weights.onnx"),
            device: DevicePreference::Cpu,
            options: YoloOptions::default(),
        })
        .await;

    assert!(result.is_err());
    assert!(!manager.is_loaded().await);
}

#[tokio::test]
#[ignore] // Only run if model files are downloaded
async fn test_load_real_weights() {
    let manager = ModelManager::new();
    let device = manager
        .load(DetectionModelConfig {
            model_path: PathBuf::from(MODEL_PATH),
            device: DevicePreference::Auto,
            options: YoloOptions::default(),
        })
        .await
        .expect("Failed to load model");

    assert!(manager.is_loaded().await);
    let model = manager.current().await.unwrap();
    assert_eq!(model.device(), device);

    let prediction = model
        .predict(&RgbImage::new(320, 240), 0.25)
        .expect("Inference failed");
    assert_eq!(prediction.source.dimensions(), (320, 240));
}
