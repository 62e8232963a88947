// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// 应用程序配置设置
///
/// 包含服务器与抓取引擎的所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 抓取引擎配置
    pub scraper: ScraperSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 抓取引擎配置设置
///
/// 导航控制器与提取流水线在构造时注入本配置，
/// 运行逻辑中不做任何环境探测。
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperSettings {
    /// 单个任务允许的最大结果数上限
    pub max_results_limit: u32,
    /// 单次导航操作超时时间（秒）
    pub navigation_timeout_secs: u64,
    /// 页面动作之后的安定等待时间（毫秒）
    pub settle_wait_ms: u64,
    /// 结果列表滚动加载的最大尝试次数
    pub max_scroll_attempts: u32,
    /// 搜索结果页的规范URL前缀，恢复导航使用
    pub search_url_base: String,
    /// 能力开关
    pub capabilities: CapabilityFlags,
}

/// 能力开关
///
/// 将环境差异（Lambda、本地调试等）收敛为显式配置值
#[derive(Debug, Clone, Deserialize)]
pub struct CapabilityFlags {
    /// 是否以无头模式启动浏览器
    pub headless: bool,
    /// 浏览器动作减速（毫秒），0为不减速
    pub slow_mo_ms: u64,
    /// 导航失败时保存调试截图
    pub screenshot_on_error: bool,
}

impl ScraperSettings {
    /// 构造指定查询的规范搜索结果URL
    ///
    /// 恢复导航与初始导航共用同一个URL形式
    pub fn search_url(&self, query: &str) -> String {
        format!("{}{}", self.search_url_base, query.trim().replace(' ', "+"))
    }
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Start with default settings
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            // Default scraper settings
            .set_default("scraper.max_results_limit", 50)?
            .set_default("scraper.navigation_timeout_secs", 30)?
            .set_default("scraper.settle_wait_ms", 3000)?
            .set_default("scraper.max_scroll_attempts", 20)?
            .set_default("scraper.search_url_base", "https://www.google.com/maps/search/")?
            // Default capability flags
            .set_default("scraper.capabilities.headless", true)?
            .set_default("scraper.capabilities.slow_mo_ms", 0)?
            .set_default("scraper.capabilities.screenshot_on_error", false)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("LEADRS").separator("__"));

        builder.build()?.try_deserialize()
    }
}
