// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Integration tests for POST /detect (multipart upload)

use std::sync::Arc;

use axum::http::StatusCode;
use image::{GenericImageView, ImageFormat};
use yolo_detect_node::vision::yolo::RawDetection;

use super::common::*;

#[tokio::test]
async fn test_detect_jpeg_without_objects() {
    let app = app_with(Arc::new(StubModel::empty()));
    let body = multipart_body("file", Some("image/jpeg"), &image_bytes(64, 48, ImageFormat::Jpeg));

    let response = send(app, multipart_request(body)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["detections"], serde_json::json!([]));
    assert_eq!(json["total_objects"], 0);
    assert_eq!(json["image_size"], serde_json::json!({"width": 64, "height": 48}));

    let annotated = decode_result_image(&json);
    assert_eq!(annotated.dimensions(), (64, 48));
}

#[tokio::test]
async fn test_detect_png_reports_rounded_regions() {
    let model = Arc::new(StubModel::new(vec![
        RawDetection {
            class_id: 0,
            confidence: 0.85432,
            xyxy: [10.126, 20.0, 110.5, 220.999],
        },
        RawDetection {
            class_id: 2,
            confidence: 0.61234,
            xyxy: [300.0, 150.0, 420.0, 260.0],
        },
    ]));
    let app = app_with(model.clone());
    let body = multipart_body("file", Some("image/png"), &image_bytes(640, 480, ImageFormat::Png));

    let response = send(app, multipart_request(body)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["total_objects"], 2);
    assert_eq!(json["detections"].as_array().unwrap().len(), 2);

    let first = &json["detections"][0];
    assert_eq!(first["class_name"], "person");
    assert_eq!(first["confidence"], 0.854);
    assert_eq!(
        first["bbox"],
        serde_json::json!({"x1": 10.13, "y1": 20.0, "x2": 110.5, "y2": 221.0})
    );

    let second = &json["detections"][1];
    assert_eq!(second["class_name"], "car");
    assert_eq!(second["confidence"], 0.612);

    assert_eq!(json["image_size"]["width"], 640);
    assert_eq!(decode_result_image(&json).dimensions(), (640, 480));

    // uploads always run at the default threshold
    assert_eq!(*model.last_confidence.lock().unwrap(), Some(0.5));
}

#[tokio::test]
async fn test_detect_rejects_non_image_content_type() {
    let app = app_with(Arc::new(StubModel::empty()));
    let body = multipart_body("file", Some("text/plain"), b"hello world");

    let response = send(app, multipart_request(body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["detail"], "Файл должен быть изображением");
}

#[tokio::test]
async fn test_detect_rejects_missing_content_type() {
    let app = app_with(Arc::new(StubModel::empty()));
    let body = multipart_body("file", None, &image_bytes(8, 8, ImageFormat::Png));

    let response = send(app, multipart_request(body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_detect_without_file_part_is_validation_error() {
    let app = app_with(Arc::new(StubModel::empty()));
    let body = multipart_body("picture", Some("image/png"), &image_bytes(8, 8, ImageFormat::Png));

    let response = send(app, multipart_request(body)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert!(json["detail"].as_str().unwrap().contains("file"));
}

#[tokio::test]
async fn test_detect_non_multipart_body_is_validation_error() {
    let app = app_with(Arc::new(StubModel::empty()));
    let request = json_request("/detect", "{}".to_string());

    let response = send(app, request).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_json(response).await["detail"].is_string());
}

#[tokio::test]
async fn test_detect_corrupt_image_is_processing_error() {
    let app = app_with(Arc::new(StubModel::empty()));
    let body = multipart_body("file", Some("image/jpeg"), b"\xFF\xD8 definitely not a jpeg");

    let response = send(app, multipart_request(body)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert!(json["detail"]
        .as_str()
        .unwrap()
        .starts_with("Ошибка обработки изображения: "));
}

#[tokio::test]
async fn test_detect_inference_failure_is_processing_error() {
    let app = app_with(Arc::new(FailingModel));
    let body = multipart_body("file", Some("image/jpeg"), &image_bytes(32, 32, ImageFormat::Jpeg));

    let response = send(app, multipart_request(body)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let detail = body_json(response).await["detail"].as_str().unwrap().to_string();
    assert!(detail.starts_with("Ошибка обработки изображения: "));
    assert!(detail.contains("CUDA out of memory"));
}

#[tokio::test]
async fn test_detect_upload_over_limit_is_payload_too_large() {
    let app = app_with_limit(Arc::new(StubModel::empty()), 1024);
    let body = multipart_body("file", Some("image/jpeg"), &vec![0u8; 8 * 1024]);

    let response = send(app, multipart_request(body)).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body_json(response).await["detail"].is_string());
}
