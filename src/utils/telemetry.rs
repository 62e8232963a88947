// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// 初始化日志订阅器
///
/// 过滤级别取自 `RUST_LOG`，缺省为 `info,leadrs=debug`。
/// 设置 `LEADRS_LOG_JSON=1` 时输出 JSON 格式，便于日志采集。
pub fn init_telemetry() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,leadrs=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var("LEADRS_LOG_JSON").map_or(false, |v| v == "1") {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
