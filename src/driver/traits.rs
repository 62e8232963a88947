// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use thiserror::Error;

use crate::driver::selectors::Selector;

/// 页面驱动错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 浏览器会话已关闭，不可恢复
    #[error("Browser session closed")]
    SessionClosed,
    /// 导航失败
    #[error("Navigation failed: {0}")]
    Navigation(String),
    /// 元素查找失败
    #[error("Element lookup failed: {0}")]
    Lookup(String),
    /// 元素句柄已失效
    #[error("Stale element handle")]
    StaleHandle,
    /// 操作超时
    #[error("Operation timed out")]
    Timeout,
    /// 浏览器底层错误
    #[error("Browser error: {0}")]
    Browser(String),
}

/// 页面元素的不透明句柄
///
/// 驱动内部维护句柄到真实元素的映射，
/// 读取接口只接受驱动自己签发的句柄。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub u64);

/// 结果面板中的一条商家列表项
#[derive(Debug, Clone)]
pub struct ListingLink {
    /// 详情页URL
    pub url: String,
    /// 面板中可见的名称提示，仅用于日志
    pub label: Option<String>,
}

/// 页面驱动特质
///
/// 导航控制器与具体浏览器实现之间的接口。
/// 所有方法针对驱动持有的当前页面操作。
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// 导航到指定URL并等待页面加载
    async fn navigate(&self, url: &str) -> Result<(), DriverError>;

    /// 回退到上一页
    async fn go_back(&self) -> Result<(), DriverError>;

    /// 会话是否已关闭
    async fn is_closed(&self) -> bool;

    /// 打开搜索结果页
    ///
    /// 定位搜索框、输入查询并提交，随后等待结果面板出现
    async fn open_search(&self, query: &str) -> Result<(), DriverError>;

    /// 收集结果面板中的商家详情链接
    ///
    /// 驱动负责滚动面板直到收集到 `max` 条或面板不再增长
    async fn collect_listing_links(&self, max: usize) -> Result<Vec<ListingLink>, DriverError>;

    /// 按目录顺序查找首个匹配的元素
    ///
    /// 逐个尝试选择器，全部未命中返回 `None`
    async fn find_first(&self, selectors: &[Selector]) -> Result<Option<ElementHandle>, DriverError>;

    /// 读取元素的可见文本
    async fn read_text(&self, handle: ElementHandle) -> Result<Option<String>, DriverError>;

    /// 读取元素属性
    async fn read_attribute(
        &self,
        handle: ElementHandle,
        name: &str,
    ) -> Result<Option<String>, DriverError>;
}

/// 驱动工厂特质
///
/// 每个任务启动时创建一个独立的页面驱动
#[async_trait]
pub trait DriverFactory: Send + Sync {
    async fn create(&self) -> Result<Box<dyn PageDriver>, DriverError>;
}
