// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use std::{env, sync::Arc};
use yolo_detect_node::{
    api::{
        create_app_with_config,
        http_server::{serve, shutdown_signal},
        AppState,
    },
    cli::Cli,
    vision::ModelManager,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    println!("🚀 Starting YOLO Detect Node...\n");
    println!("📦 BUILD VERSION: {}", yolo_detect_node::version::get_version_string());
    println!();

    let config = Cli::parse()
        .into_config()
        .context("Invalid configuration")?;

    // Load the detector before accepting traffic; a missing model is fatal
    println!("🧠 Loading detection model...");
    let model_manager = Arc::new(ModelManager::new());
    let device = model_manager
        .load(config.model_config())
        .await
        .context("Detection model failed to load")?;
    println!("✅ Model loaded on {}", device);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.addr))?;

    let separator = "=".repeat(60);
    println!("\n{}", separator);
    println!("Model path:     {}", config.model_path.display());
    println!("Device:         {}", device);
    println!("\nAPI Endpoints:");
    println!("  Root:         http://{}/", config.addr);
    println!("  Health:       http://{}/health", config.addr);
    println!("  Detect:       POST http://{}/detect", config.addr);
    println!("  Detect b64:   POST http://{}/detect_base64", config.addr);
    println!("\nPress Ctrl+C to shutdown...");
    println!("{}\n", separator);

    let app = create_app_with_config(
        AppState::new(model_manager.clone()),
        config.router_config(),
    );
    serve(listener, app, shutdown_signal())
        .await
        .context("HTTP server error")?;

    println!("\n⏹️  Shutting down...");
    model_manager.release().await;

    println!("👋 Goodbye!");
    Ok(())
}
