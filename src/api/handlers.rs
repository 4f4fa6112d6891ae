// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::http_server::AppState;

/// Greeting returned by `GET /`
pub const ROOT_MESSAGE: &str = "YOLO Object Detection API работает";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RootResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    /// True once a model handle is installed; not a probe of inference
    pub model_loaded: bool,
}

impl HealthResponse {
    pub fn healthy(model_loaded: bool) -> Self {
        Self {
            status: "healthy".to_string(),
            model_loaded,
        }
    }
}

/// GET / - Liveness greeting
pub async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        message: ROOT_MESSAGE.to_string(),
    })
}

/// GET /health - Service status and model presence
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let model_loaded = state.model_manager.is_loaded().await;
    Json(HealthResponse::healthy(model_loaded))
}
