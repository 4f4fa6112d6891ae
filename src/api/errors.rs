// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::detect::DetectionError;

/// Detail prefix on every 500 response
pub const PROCESSING_ERROR_PREFIX: &str = "Ошибка обработки изображения";

/// Uploaded part has a non-image content type
pub const NOT_AN_IMAGE_MESSAGE: &str = "Файл должен быть изображением";

/// Base64 request without an `image` value
pub const IMAGE_REQUIRED_MESSAGE: &str = "Поле 'image' обязательно";

/// Body shape shared by every error response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    /// Client sent a wrong-shaped or empty required field
    InvalidInput(String),
    /// Request could not be parsed into the expected shape
    Validation(String),
    /// Body exceeded the configured upload limit
    PayloadTooLarge(String),
    /// Anything that went wrong after the request was accepted
    Internal(String),
}

impl ApiError {
    pub fn not_an_image() -> Self {
        ApiError::InvalidInput(NOT_AN_IMAGE_MESSAGE.to_string())
    }

    pub fn image_required() -> Self {
        ApiError::InvalidInput(IMAGE_REQUIRED_MESSAGE.to_string())
    }

    /// Wrap a failure description in the fixed processing-error prefix
    pub fn processing(failure: impl fmt::Display) -> Self {
        ApiError::Internal(format!("{}: {}", PROCESSING_ERROR_PREFIX, failure))
    }

    /// Classify an extractor rejection by the status it carries
    pub fn rejection(status: StatusCode, body_text: String) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(body_text)
        } else {
            ApiError::Validation(body_text)
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            ApiError::InvalidInput(msg)
            | ApiError::Validation(msg)
            | ApiError::PayloadTooLarge(msg)
            | ApiError::Internal(msg) => msg,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            detail: self.detail().to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            ApiError::Validation(msg) => write!(f, "Validation error: {}", msg),
            ApiError::PayloadTooLarge(msg) => write!(f, "Payload too large: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<DetectionError> for ApiError {
    fn from(err: DetectionError) -> Self {
        ApiError::processing(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_response())).into_response()
    }
}
