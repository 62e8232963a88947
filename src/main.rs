// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::Extension;
use leadrs::config::settings::Settings;
use leadrs::driver::chromium::ChromiumDriverFactory;
use leadrs::driver::DriverFactory;
use leadrs::presentation::routes;
use leadrs::registry::TaskRegistry;
use leadrs::store::{MemoryRecordStore, RecordStore};
use leadrs::utils::telemetry;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting leadrs...");

    // 2. Load configuration
    let settings = Arc::new(Settings::new()?);
    info!("Configuration loaded");

    // 3. Initialize Components
    let store: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new());
    let factory: Arc<dyn DriverFactory> =
        Arc::new(ChromiumDriverFactory::new(settings.scraper.clone()));
    let registry = Arc::new(TaskRegistry::new(
        settings.scraper.clone(),
        factory,
        store,
    ));
    info!("Task registry initialized");

    // 4. Start HTTP server
    let app = routes::routes()
        .layer(Extension(registry))
        .layer(Extension(settings.clone()))
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
