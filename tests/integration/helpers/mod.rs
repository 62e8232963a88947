// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod mock_driver;

use axum::Extension;
use axum_test::TestServer;
use leadrs::config::settings::{CapabilityFlags, ScraperSettings};
use leadrs::driver::DriverFactory;
use leadrs::registry::TaskRegistry;
use leadrs::store::{MemoryRecordStore, RecordStore};
use std::sync::Arc;

use mock_driver::{MockDriverFactory, MockScript, MockStats, SEARCH_URL_BASE};

/// 测试用抓取配置，无等待、有限滚动
pub fn test_scraper_settings() -> ScraperSettings {
    ScraperSettings {
        max_results_limit: 10,
        navigation_timeout_secs: 5,
        settle_wait_ms: 0,
        max_scroll_attempts: 3,
        search_url_base: SEARCH_URL_BASE.to_string(),
        capabilities: CapabilityFlags {
            headless: true,
            slow_mo_ms: 0,
            screenshot_on_error: false,
        },
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub registry: Arc<TaskRegistry>,
    pub stats: Arc<MockStats>,
}

/// 构建接入模拟驱动的完整测试应用
pub fn create_test_app(script: MockScript) -> TestApp {
    let factory = MockDriverFactory::new(script);
    let stats = factory.stats.clone();
    let factory: Arc<dyn DriverFactory> = Arc::new(factory);
    let store: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new());
    let registry = Arc::new(TaskRegistry::new(test_scraper_settings(), factory, store));

    let app = leadrs::presentation::routes::routes().layer(Extension(registry.clone()));
    let server = TestServer::new(app).expect("test server should start");

    TestApp {
        server,
        registry,
        stats,
    }
}
