// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Integration tests for POST /detect_base64

use std::sync::Arc;

use axum::http::StatusCode;
use image::GenericImageView;
use yolo_detect_node::vision::yolo::RawDetection;

use super::common::*;

#[tokio::test]
async fn test_base64_detection_uses_requested_confidence() {
    let model = Arc::new(StubModel::new(vec![RawDetection {
        class_id: 16,
        confidence: 0.4,
        xyxy: [5.0, 5.0, 60.0, 40.0],
    }]));
    let app = app_with(model.clone());
    let payload = serde_json::json!({ "image": jpeg_base64(80, 60), "confidence": 0.3 });

    let response = send(app, json_request("/detect_base64", payload.to_string())).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["total_objects"], 1);
    assert_eq!(json["detections"][0]["class_name"], "dog");
    assert_eq!(json["detections"][0]["confidence"], 0.4);
    assert!(json.get("image_size").is_none());
    assert_eq!(decode_result_image(&json).dimensions(), (80, 60));

    assert_eq!(*model.last_confidence.lock().unwrap(), Some(0.3));
}

#[tokio::test]
async fn test_base64_confidence_defaults() {
    for payload in [
        serde_json::json!({ "image": jpeg_base64(16, 16) }),
        serde_json::json!({ "image": jpeg_base64(16, 16), "confidence": null }),
    ] {
        let model = Arc::new(StubModel::empty());
        let app = app_with(model.clone());

        let response = send(app, json_request("/detect_base64", payload.to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(*model.last_confidence.lock().unwrap(), Some(0.5));
    }
}

#[tokio::test]
async fn test_base64_accepts_data_url_prefix() {
    let app = app_with(Arc::new(StubModel::empty()));
    let payload = serde_json::json!({
        "image": format!("data:image/jpeg;base64,{}", jpeg_base64(24, 12))
    });

    let response = send(app, json_request("/detect_base64", payload.to_string())).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["total_objects"], 0);
}

#[tokio::test]
async fn test_base64_accepts_line_wrapped_payload() {
    let app = app_with(Arc::new(StubModel::empty()));
    let encoded = jpeg_base64(120, 90);
    let wrapped = encoded
        .as_bytes()
        .chunks(76)
        .map(|line| std::str::from_utf8(line).unwrap())
        .collect::<Vec<_>>()
        .join("\n");
    assert!(wrapped.contains('\n'));

    let payload = serde_json::json!({ "image": wrapped });
    let response = send(app, json_request("/detect_base64", payload.to_string())).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(decode_result_image(&json).dimensions(), (120, 90));
}

#[tokio::test]
async fn test_base64_body_over_limit_is_payload_too_large() {
    let app = app_with_limit(Arc::new(StubModel::empty()), 1024);
    let payload = serde_json::json!({ "image": "A".repeat(8 * 1024) });

    let response = send(app, json_request("/detect_base64", payload.to_string())).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body_json(response).await["detail"].is_string());
}

#[tokio::test]
async fn test_base64_missing_image_is_bad_request() {
    for payload in [
        serde_json::json!({ "confidence": 0.5 }),
        serde_json::json!({ "image": "" }),
        serde_json::json!({ "image": null }),
    ] {
        let app = app_with(Arc::new(StubModel::empty()));
        let response = send(app, json_request("/detect_base64", payload.to_string())).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["detail"], "Поле 'image' обязательно");
    }
}

#[tokio::test]
async fn test_base64_malformed_json_is_validation_error() {
    let app = app_with(Arc::new(StubModel::empty()));

    let response = send(app, json_request("/detect_base64", "{not json".to_string())).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_json(response).await["detail"].is_string());
}

#[tokio::test]
async fn test_base64_invalid_payload_is_processing_error() {
    let app = app_with(Arc::new(StubModel::empty()));
    let payload = serde_json::json!({ "image": "%%% not base64 %%%" });

    let response = send(app, json_request("/detect_base64", payload.to_string())).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let detail = body_json(response).await["detail"].as_str().unwrap().to_string();
    assert!(detail.starts_with("Ошибка обработки изображения: "));
}

#[tokio::test]
async fn test_base64_valid_encoding_of_non_image_is_processing_error() {
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    let app = app_with(Arc::new(StubModel::empty()));
    let payload = serde_json::json!({ "image": STANDARD.encode(b"plain text, not pixels") });

    let response = send(app, json_request("/detect_base64", payload.to_string())).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
