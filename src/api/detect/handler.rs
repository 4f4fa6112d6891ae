// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection endpoint handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::{multipart::MultipartRejection, Multipart};
use tracing::{debug, error, info, warn};

use super::pipeline::{detect, DetectionError, DetectionOutput, ImageSource};
use super::request::{Base64ImageRequest, DEFAULT_CONFIDENCE};
use super::response::DetectionResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;

/// Multipart field carrying the upload
pub const FILE_FIELD: &str = "file";

/// POST /detect - Detect objects in an uploaded image file
///
/// # Request
/// Multipart form with a `file` part whose content type is `image/*`.
/// Detection always runs at confidence 0.5.
///
/// # Response
/// - `detections`: Objects in model order
/// - `total_objects`: Number of detections
/// - `result_image`: Annotated JPEG, base64
/// - `image_size`: Width and height of the uploaded image
///
/// # Errors
/// - 400 Bad Request: Content type is not an image
/// - 413 Payload Too Large: Body exceeds the upload limit
/// - 422 Unprocessable Entity: No `file` part, or unreadable form
/// - 500 Internal Server Error: Decoding, inference or encoding failed
pub async fn detect_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<DetectionResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        warn!("Rejected multipart request: {}", e);
        ApiError::rejection(e.status(), e.body_text())
    })?;

    // 1. Find the file part
    let field = loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some(FILE_FIELD) => break field,
            Ok(Some(_)) => continue,
            Ok(None) => {
                warn!("Detect request without '{}' part", FILE_FIELD);
                return Err(ApiError::Validation(format!(
                    "Field required: {}",
                    FILE_FIELD
                )));
            }
            Err(e) => {
                warn!("Malformed multipart body: {}", e);
                return Err(ApiError::rejection(e.status(), e.body_text()));
            }
        }
    };

    // 2. Validate declared content type
    let content_type = field.content_type().unwrap_or_default().to_string();
    if !content_type.starts_with("image/") {
        warn!("Upload rejected, content type '{}'", content_type);
        return Err(ApiError::not_an_image());
    }

    // 3. Read the body
    let bytes = field.bytes().await.map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            warn!("Upload over the body limit: {}", e);
            ApiError::PayloadTooLarge(e.body_text())
        } else {
            pipeline_failure(DetectionError::Upload(e.to_string()))
        }
    })?;

    debug!("Received upload: {}, {} bytes", content_type, bytes.len());

    // 4. Decode, detect, format, render
    let output = run(&state, ImageSource::Bytes(bytes.to_vec()), DEFAULT_CONFIDENCE).await?;
    let image_size = output.image_size;

    Ok(Json(
        DetectionResponse::new(output.detections, output.result_image).with_image_size(image_size),
    ))
}

/// POST /detect_base64 - Detect objects in a base64-encoded image
///
/// # Request
/// - `image`: Base64-encoded image data (required)
/// - `confidence`: Threshold, defaults to 0.5
///
/// # Response
/// Same as `/detect` without `image_size`.
///
/// # Errors
/// - 400 Bad Request: `image` missing or empty
/// - 413 Payload Too Large: Body exceeds the upload limit
/// - 422 Unprocessable Entity: Body is not a JSON object of the expected shape
/// - 500 Internal Server Error: Decoding, inference or encoding failed
pub async fn detect_base64_handler(
    State(state): State<AppState>,
    payload: Result<Json<Base64ImageRequest>, JsonRejection>,
) -> Result<Json<DetectionResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| {
        warn!("Rejected JSON body: {}", e);
        ApiError::rejection(e.status(), e.body_text())
    })?;

    let image = request.validate().map_err(|e| {
        warn!("Base64 detection validation failed: {}", e);
        e
    })?;
    let confidence = request.confidence();

    debug!(
        "Base64 detection request: {} chars, confidence {}",
        image.len(),
        confidence
    );

    let output = run(&state, ImageSource::Base64(image.to_string()), confidence).await?;

    Ok(Json(DetectionResponse::new(
        output.detections,
        output.result_image,
    )))
}

async fn run(
    state: &AppState,
    source: ImageSource,
    confidence: f32,
) -> Result<DetectionOutput, ApiError> {
    let model = state
        .model_manager
        .current()
        .await
        .ok_or_else(|| pipeline_failure(DetectionError::ModelUnavailable))?;

    let output = detect(model, source, confidence)
        .await
        .map_err(pipeline_failure)?;

    info!(
        "Detection complete: {} objects, {}x{}, {}ms",
        output.detections.len(),
        output.image_size.width,
        output.image_size.height,
        output.processing_time_ms
    );

    Ok(output)
}

fn pipeline_failure(err: DetectionError) -> ApiError {
    error!(stage = err.stage(), "Detection failed: {}", err);
    ApiError::from(err)
}
