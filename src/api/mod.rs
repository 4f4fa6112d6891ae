// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod detect;
pub mod errors;
pub mod handlers;
pub mod http_server;

pub use detect::{
    detect_base64_handler, detect_handler, Base64ImageRequest, BoundingBox, Detection,
    DetectionResponse, ImageSize,
};
pub use errors::{ApiError, ErrorResponse};
pub use handlers::{HealthResponse, RootResponse};
pub use http_server::{create_app, create_app_with_config, AppState, RouterConfig};
