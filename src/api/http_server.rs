// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::{future::Future, sync::Arc};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::detect::{detect_base64_handler, detect_handler};
use super::handlers::{health_handler, root_handler};
use crate::vision::{DetectionModel, ModelManager};

/// Default cap on request bodies (20 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub model_manager: Arc<ModelManager>,
}

impl AppState {
    pub fn new(model_manager: Arc<ModelManager>) -> Self {
        Self { model_manager }
    }

    /// State with no model installed
    pub fn new_for_test() -> Self {
        Self::new(Arc::new(ModelManager::new()))
    }

    /// State serving an already constructed model
    pub fn with_model(model: Arc<dyn DetectionModel>) -> Self {
        Self::new(Arc::new(ModelManager::with_model(model)))
    }
}

#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub max_upload_bytes: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Build the router with default limits
pub fn create_app(state: AppState) -> Router {
    create_app_with_config(state, RouterConfig::default())
}

pub fn create_app_with_config(state: AppState, config: RouterConfig) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/detect", post(detect_handler))
        .route("/detect_base64", post(detect_base64_handler))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Serve `app` on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("🌐 HTTP server listening on {}", addr);
    }
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

/// Resolves on Ctrl+C, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
