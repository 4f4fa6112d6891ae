// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Shared fixtures for router tests
#![allow(dead_code)]

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use tower::util::ServiceExt;
use yolo_detect_node::{
    api::{create_app, create_app_with_config, AppState, RouterConfig},
    vision::yolo::{ClassNames, Device, DetectionModel, ModelError, Prediction, RawDetection},
};

pub const BOUNDARY: &str = "----yolo-detect-test-boundary";

/// Detector returning a fixed set of regions, recording the confidence it was called with
pub struct StubModel {
    detections: Vec<RawDetection>,
    pub last_confidence: Mutex<Option<f32>>,
}

impl StubModel {
    pub fn new(detections: Vec<RawDetection>) -> Self {
        Self {
            detections,
            last_confidence: Mutex::new(None),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

impl DetectionModel for StubModel {
    fn predict(&self, image: &RgbImage, confidence: f32) -> Result<Prediction, ModelError> {
        *self.last_confidence.lock().unwrap() = Some(confidence);
        Ok(Prediction::new(
            self.detections.clone(),
            Arc::new(ClassNames::coco()),
            Arc::new(image.clone()),
        ))
    }

    fn device(&self) -> Device {
        Device::Cpu
    }
}

/// Detector whose inference always fails
pub struct FailingModel;

impl DetectionModel for FailingModel {
    fn predict(&self, _image: &RgbImage, _confidence: f32) -> Result<Prediction, ModelError> {
        Err(ModelError::Inference("CUDA out of memory".to_string()))
    }

    fn device(&self) -> Device {
        Device::Cuda
    }
}

pub fn app_with(model: Arc<dyn DetectionModel>) -> Router {
    create_app(AppState::with_model(model))
}

/// Router with a small body limit for oversize upload tests
pub fn app_with_limit(model: Arc<dyn DetectionModel>, max_upload_bytes: usize) -> Router {
    create_app_with_config(AppState::with_model(model), RouterConfig { max_upload_bytes })
}

pub fn image_bytes(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([40, 120, 200])))
        .write_to(&mut buffer, format)
        .unwrap();
    buffer.into_inner()
}

pub fn jpeg_base64(width: u32, height: u32) -> String {
    STANDARD.encode(image_bytes(width, height, ImageFormat::Jpeg))
}

/// Single-part multipart body
pub fn multipart_body(field: &str, content_type: Option<&str>, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"upload.bin\"\r\n",
            field
        )
        .as_bytes(),
    );
    if let Some(content_type) = content_type {
        body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
    }
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/detect")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn json_request(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Decode the `result_image` field back into pixels
pub fn decode_result_image(body: &serde_json::Value) -> DynamicImage {
    let encoded = body["result_image"].as_str().unwrap();
    let bytes = STANDARD.decode(encoded).unwrap();
    assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
    image::load_from_memory(&bytes).unwrap()
}
