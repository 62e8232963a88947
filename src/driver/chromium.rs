// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::settings::ScraperSettings;
use crate::driver::selectors::{self, Selector};
use crate::driver::traits::{DriverError, DriverFactory, ElementHandle, ListingLink, PageDriver};

/// 基于 chromiumoxide 的页面驱动
///
/// 每个任务独占一个浏览器实例和页面。元素查找结果以不透明句柄返回，
/// 真实元素保存在驱动内部映射中，页面导航后句柄即失效。
pub struct ChromiumDriver {
    _browser: Browser,
    page: Page,
    settings: ScraperSettings,
    closed: Arc<AtomicBool>,
    next_handle: AtomicU64,
    elements: Mutex<HashMap<u64, Element>>,
}

impl ChromiumDriver {
    /// 启动浏览器并打开空白页面
    pub async fn launch(settings: ScraperSettings) -> Result<Self, DriverError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .request_timeout(Duration::from_secs(settings.navigation_timeout_secs));

        builder = builder.arg("--disable-gpu").arg("--disable-dev-shm-usage");

        if !settings.capabilities.headless {
            builder = builder.with_head();
        }

        let config = builder
            .build()
            .map_err(|e| DriverError::Browser(e.to_string()))?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| DriverError::Browser(e.to_string()))?;

        let closed = Arc::new(AtomicBool::new(false));
        let closed_flag = closed.clone();

        // The handler stream ends when the browser process goes away.
        tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
            closed_flag.store(true, Ordering::SeqCst);
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| DriverError::Browser(e.to_string()))?;

        info!("chromium driver launched");

        Ok(Self {
            _browser: browser,
            page,
            settings,
            closed,
            next_handle: AtomicU64::new(1),
            elements: Mutex::new(HashMap::new()),
        })
    }

    fn ensure_open(&self) -> Result<(), DriverError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(DriverError::SessionClosed);
        }
        Ok(())
    }

    async fn slow_mo(&self) {
        let ms = self.settings.capabilities.slow_mo_ms;
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }

    async fn settle(&self) {
        tokio::time::sleep(Duration::from_millis(self.settings.settle_wait_ms)).await;
    }

    /// 导航失败时保存调试截图，按能力开关启用
    async fn capture_failure(&self, tag: &str) {
        if !self.settings.capabilities.screenshot_on_error {
            return;
        }
        let path = format!("debug_{}.png", tag);
        let params = chromiumoxide::page::ScreenshotParams::builder().build();
        match self.page.save_screenshot(params, &path).await {
            Ok(_) => info!(%path, "debug screenshot saved"),
            Err(e) => warn!(error = %e, "failed to capture debug screenshot"),
        }
    }

    /// 导航后旧句柄全部失效
    async fn invalidate_handles(&self) {
        self.elements.lock().await.clear();
    }

    async fn store_element(&self, element: Element) -> ElementHandle {
        let id = self.next_handle.fetch_add(1, Ordering::SeqCst);
        self.elements.lock().await.insert(id, element);
        ElementHandle(id)
    }

    /// 轮询等待结果面板出现
    async fn wait_for_results_view(&self) -> Result<(), DriverError> {
        let deadline = Duration::from_secs(self.settings.navigation_timeout_secs);
        let poll = Duration::from_millis(500);

        tokio::time::timeout(deadline, async {
            loop {
                for selector in selectors::RESULTS_VIEW {
                    if self.page.find_element(selector.as_str()).await.is_ok() {
                        return;
                    }
                }
                tokio::time::sleep(poll).await;
            }
        })
        .await
        .map_err(|_| DriverError::Timeout)
    }

    /// 收集当前面板可见的详情链接，保持文档顺序去重
    async fn visible_listing_links(&self) -> Result<Vec<ListingLink>, DriverError> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut links = Vec::new();

        for selector in selectors::LISTING_LINKS {
            let elements = match self.page.find_elements(selector.as_str()).await {
                Ok(elements) => elements,
                Err(_) => continue,
            };
            for element in elements {
                let href = match element.attribute("href").await {
                    Ok(Some(href)) => href,
                    _ => continue,
                };
                if !href.contains("/maps/place/") || !seen.insert(href.clone()) {
                    continue;
                }
                let label = element.attribute("aria-label").await.ok().flatten();
                links.push(ListingLink { url: href, label });
            }
        }

        Ok(links)
    }
}

#[async_trait]
impl PageDriver for ChromiumDriver {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.ensure_open()?;
        self.invalidate_handles().await;

        let timeout = Duration::from_secs(self.settings.navigation_timeout_secs);
        match tokio::time::timeout(timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                self.capture_failure("navigation").await;
                return Err(DriverError::Navigation(e.to_string()));
            }
            Err(_) => {
                self.capture_failure("navigation_timeout").await;
                return Err(DriverError::Timeout);
            }
        }

        self.slow_mo().await;
        Ok(())
    }

    async fn go_back(&self) -> Result<(), DriverError> {
        self.ensure_open()?;
        self.invalidate_handles().await;

        self.page
            .evaluate("history.back()")
            .await
            .map_err(|e| DriverError::Navigation(e.to_string()))?;
        self.settle().await;
        Ok(())
    }

    async fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    async fn open_search(&self, query: &str) -> Result<(), DriverError> {
        self.ensure_open()?;

        // Canonical search URL first, typing into the search box is the
        // fallback for layouts that redirect to the plain maps view.
        let url = self.settings.search_url(query);
        debug!(%url, "opening search results");
        self.navigate(&url).await?;

        if self.wait_for_results_view().await.is_ok() {
            return Ok(());
        }

        warn!("results view not present after direct navigation, retrying via search box");
        for selector in selectors::SEARCH_BOX {
            let search_box = match self.page.find_element(selector.as_str()).await {
                Ok(element) => element,
                Err(_) => continue,
            };
            search_box
                .click()
                .await
                .map_err(|e| DriverError::Browser(e.to_string()))?;
            search_box
                .type_str(query)
                .await
                .map_err(|e| DriverError::Browser(e.to_string()))?;

            if search_box.press_key("Enter").await.is_err() {
                for button in selectors::SEARCH_BUTTON {
                    if let Ok(button) = self.page.find_element(button.as_str()).await {
                        button
                            .click()
                            .await
                            .map_err(|e| DriverError::Browser(e.to_string()))?;
                        break;
                    }
                }
            }

            self.slow_mo().await;
            return self.wait_for_results_view().await;
        }

        self.capture_failure("search_box").await;
        Err(DriverError::Lookup("search box not found".to_string()))
    }

    async fn collect_listing_links(&self, max: usize) -> Result<Vec<ListingLink>, DriverError> {
        self.ensure_open()?;

        let mut links = self.visible_listing_links().await?;
        let mut attempts = 0u32;

        // Scroll the results feed until enough links are visible or the
        // panel stops growing.
        while links.len() < max && attempts < self.settings.max_scroll_attempts {
            let before = links.len();
            self.page
                .evaluate(
                    "const feed = document.querySelector('div[role=\"feed\"]') \
                        || document.querySelector('div[role=\"main\"]'); \
                     if (feed) { feed.scrollTop = feed.scrollHeight; } \
                     else { window.scrollTo(0, document.body.scrollHeight); }",
                )
                .await
                .map_err(|e| DriverError::Browser(e.to_string()))?;
            self.settle().await;

            links = self.visible_listing_links().await?;
            attempts += 1;
            if links.len() == before {
                debug!(attempts, collected = links.len(), "results panel stopped growing");
                break;
            }
        }

        links.truncate(max);
        Ok(links)
    }

    async fn find_first(
        &self,
        catalog: &[Selector],
    ) -> Result<Option<ElementHandle>, DriverError> {
        self.ensure_open()?;

        for selector in catalog {
            if let Ok(element) = self.page.find_element(selector.as_str()).await {
                return Ok(Some(self.store_element(element).await));
            }
        }
        Ok(None)
    }

    async fn read_text(&self, handle: ElementHandle) -> Result<Option<String>, DriverError> {
        self.ensure_open()?;

        let elements = self.elements.lock().await;
        let element = elements.get(&handle.0).ok_or(DriverError::StaleHandle)?;
        element
            .inner_text()
            .await
            .map_err(|e| DriverError::Browser(e.to_string()))
    }

    async fn read_attribute(
        &self,
        handle: ElementHandle,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        self.ensure_open()?;

        let elements = self.elements.lock().await;
        let element = elements.get(&handle.0).ok_or(DriverError::StaleHandle)?;
        element
            .attribute(name)
            .await
            .map_err(|e| DriverError::Browser(e.to_string()))
    }
}

/// Chromium 驱动工厂
///
/// 每个任务启动一个独立的浏览器实例，任务间互不干扰
pub struct ChromiumDriverFactory {
    settings: ScraperSettings,
}

impl ChromiumDriverFactory {
    pub fn new(settings: ScraperSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl DriverFactory for ChromiumDriverFactory {
    async fn create(&self) -> Result<Box<dyn PageDriver>, DriverError> {
        let driver = ChromiumDriver::launch(self.settings.clone()).await?;
        Ok(Box::new(driver))
    }
}
