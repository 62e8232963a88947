// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use leadrs::driver::selectors::{self, Selector};
use leadrs::driver::{DriverError, DriverFactory, ElementHandle, ListingLink, PageDriver};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const SEARCH_URL_BASE: &str = "https://maps.example.test/search/";
pub const PLACE_URL_BASE: &str = "https://maps.example.test/place/";

/// 脚本化的详情页内容
#[derive(Debug, Clone, Default)]
pub struct MockListing {
    pub name: Option<String>,
    /// 名称所在的选择器序位，更靠前的选择器命中空文本元素
    pub name_rank: usize,
    pub phone_text: Option<String>,
    pub tel_href: Option<String>,
    pub website_href: Option<String>,
    pub email_href: Option<String>,
    pub social_href: Option<String>,
    pub messaging_href: Option<String>,
    pub address: Option<String>,
    pub rating_label: Option<String>,
}

impl MockListing {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    pub fn unnamed() -> Self {
        Self::default()
    }

    /// 名称只出现在目录第 `rank` 位的选择器下
    pub fn name_at_rank(mut self, rank: usize) -> Self {
        self.name_rank = rank;
        self
    }

    pub fn phone(mut self, value: &str) -> Self {
        self.phone_text = Some(value.to_string());
        self
    }

    pub fn tel(mut self, value: &str) -> Self {
        self.tel_href = Some(value.to_string());
        self
    }

    pub fn website(mut self, value: &str) -> Self {
        self.website_href = Some(value.to_string());
        self
    }

    pub fn email(mut self, value: &str) -> Self {
        self.email_href = Some(value.to_string());
        self
    }

    pub fn social(mut self, value: &str) -> Self {
        self.social_href = Some(value.to_string());
        self
    }

    pub fn messaging(mut self, value: &str) -> Self {
        self.messaging_href = Some(value.to_string());
        self
    }

    pub fn address(mut self, value: &str) -> Self {
        self.address = Some(value.to_string());
        self
    }

    pub fn rating(mut self, value: &str) -> Self {
        self.rating_label = Some(value.to_string());
        self
    }
}

/// 模拟驱动的行为脚本
#[derive(Clone, Default)]
pub struct MockScript {
    pub listings: Vec<MockListing>,
    /// 打开这些下标的详情页始终失败
    pub fail_open: HashSet<usize>,
    /// 从这些下标的详情页回退失败
    pub fail_go_back_from: HashSet<usize>,
    /// 恢复导航（导航到搜索URL）失败
    pub fail_recovery: bool,
    /// 完整处理这么多个详情页之后会话关闭
    pub close_after_visits: Option<usize>,
    /// 每次打开详情页前的延迟，用于并发轮询测试
    pub visit_delay_ms: u64,
}

impl MockScript {
    pub fn with_listings(listings: Vec<MockListing>) -> Self {
        Self {
            listings,
            ..Default::default()
        }
    }
}

/// 运行统计，跨工厂共享供断言使用
#[derive(Default)]
pub struct MockStats {
    pub open_attempts: AtomicU32,
    pub detail_visits: AtomicU32,
    pub recoveries: AtomicU32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Location {
    #[default]
    Nowhere,
    Results,
    Detail(usize),
}

#[derive(Default)]
struct MockElement {
    text: Option<String>,
    attrs: HashMap<&'static str, String>,
}

#[derive(Default)]
struct Inner {
    location: Location,
    visits: usize,
    closed: bool,
    next_handle: u64,
    elements: HashMap<u64, MockElement>,
}

/// 脚本化页面驱动
///
/// 按脚本回应导航与查找请求，记录统计供测试断言
pub struct MockDriver {
    script: MockScript,
    stats: Arc<MockStats>,
    inner: Mutex<Inner>,
}

impl MockDriver {
    pub fn new(script: MockScript, stats: Arc<MockStats>) -> Self {
        Self {
            script,
            stats,
            inner: Mutex::new(Inner::default()),
        }
    }

    fn store_element(inner: &mut Inner, element: MockElement) -> ElementHandle {
        inner.next_handle += 1;
        let id = inner.next_handle;
        inner.elements.insert(id, element);
        ElementHandle(id)
    }

    fn text_element(value: &Option<String>) -> Option<MockElement> {
        value.as_ref().map(|text| MockElement {
            text: Some(text.clone()),
            attrs: HashMap::new(),
        })
    }

    fn href_element(value: &Option<String>) -> Option<MockElement> {
        value.as_ref().map(|href| MockElement {
            text: None,
            attrs: HashMap::from([("href", href.clone())]),
        })
    }

    fn rank_in(catalog: &[Selector], selector: &Selector) -> Option<usize> {
        catalog.iter().position(|s| s == selector)
    }

    /// 单个选择器到页面元素的映射
    ///
    /// 名称目录按 `name_rank` 摆放：更靠前的选择器命中存在但文本为空的
    /// 标题元素，其余字段挂在各自目录的首位选择器下。
    fn element_for_selector(listing: &MockListing, selector: &Selector) -> Option<MockElement> {
        if let Some(rank) = Self::rank_in(selectors::NAME, selector) {
            listing.name.as_ref()?;
            return match rank.cmp(&listing.name_rank) {
                std::cmp::Ordering::Less => Some(MockElement {
                    text: Some(String::new()),
                    attrs: HashMap::new(),
                }),
                std::cmp::Ordering::Equal => Self::text_element(&listing.name),
                std::cmp::Ordering::Greater => None,
            };
        }
        if Self::rank_in(selectors::PHONE_TEXT, selector) == Some(0) {
            return Self::text_element(&listing.phone_text);
        }
        if Self::rank_in(selectors::PHONE_TEL, selector) == Some(0) {
            return Self::href_element(&listing.tel_href);
        }
        if Self::rank_in(selectors::WEBSITE, selector) == Some(0) {
            return Self::href_element(&listing.website_href);
        }
        if Self::rank_in(selectors::EMAIL, selector) == Some(0) {
            return Self::href_element(&listing.email_href);
        }
        if Self::rank_in(selectors::SOCIAL, selector) == Some(0) {
            return Self::href_element(&listing.social_href);
        }
        if Self::rank_in(selectors::MESSAGING, selector) == Some(0) {
            return Self::href_element(&listing.messaging_href);
        }
        if Self::rank_in(selectors::ADDRESS, selector) == Some(0) {
            return Self::text_element(&listing.address);
        }
        if Self::rank_in(selectors::RATING, selector) == Some(0) {
            return listing.rating_label.as_ref().map(|label| MockElement {
                text: Some(label.clone()),
                attrs: HashMap::from([("aria-label", label.clone())]),
            });
        }
        None
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        if self.script.visit_delay_ms > 0 && url.starts_with(PLACE_URL_BASE) {
            tokio::time::sleep(Duration::from_millis(self.script.visit_delay_ms)).await;
        }

        let mut inner = self.inner.lock().unwrap();
        if inner.closed {
            return Err(DriverError::SessionClosed);
        }
        inner.elements.clear();

        if url.starts_with(SEARCH_URL_BASE) {
            self.stats.recoveries.fetch_add(1, Ordering::SeqCst);
            if self.script.fail_recovery {
                inner.location = Location::Nowhere;
                return Err(DriverError::Navigation("recovery blocked".to_string()));
            }
            inner.location = Location::Results;
            return Ok(());
        }

        if let Some(index) = url
            .strip_prefix(PLACE_URL_BASE)
            .and_then(|rest| rest.parse::<usize>().ok())
        {
            self.stats.open_attempts.fetch_add(1, Ordering::SeqCst);
            if self.script.fail_open.contains(&index) {
                inner.location = Location::Nowhere;
                return Err(DriverError::Navigation(format!(
                    "listing {} unreachable",
                    index
                )));
            }
            inner.location = Location::Detail(index);
            inner.visits += 1;
            self.stats.detail_visits.fetch_add(1, Ordering::SeqCst);
            return Ok(());
        }

        Err(DriverError::Navigation(format!("unknown url: {}", url)))
    }

    async fn go_back(&self) -> Result<(), DriverError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.closed {
            return Err(DriverError::SessionClosed);
        }
        inner.elements.clear();

        if let Location::Detail(index) = inner.location {
            if self.script.fail_go_back_from.contains(&index) {
                inner.location = Location::Nowhere;
                return Err(DriverError::Navigation("back navigation lost".to_string()));
            }
        }
        inner.location = Location::Results;
        Ok(())
    }

    async fn is_closed(&self) -> bool {
        self.inner.lock().unwrap().closed
    }

    async fn open_search(&self, _query: &str) -> Result<(), DriverError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.closed {
            return Err(DriverError::SessionClosed);
        }
        inner.location = Location::Results;
        Ok(())
    }

    async fn collect_listing_links(&self, max: usize) -> Result<Vec<ListingLink>, DriverError> {
        let inner = self.inner.lock().unwrap();
        if inner.closed {
            return Err(DriverError::SessionClosed);
        }
        Ok(self
            .script
            .listings
            .iter()
            .take(max)
            .enumerate()
            .map(|(index, listing)| ListingLink {
                url: format!("{}{}", PLACE_URL_BASE, index),
                label: listing.name.clone(),
            })
            .collect())
    }

    async fn find_first(
        &self,
        catalog: &[Selector],
    ) -> Result<Option<ElementHandle>, DriverError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.closed {
            return Err(DriverError::SessionClosed);
        }

        if catalog == selectors::RESULTS_VIEW {
            let present = inner.location == Location::Results;
            let handle = present.then(|| Self::store_element(&mut inner, MockElement::default()));
            // The scripted session dies once the configured number of
            // listings has been fully processed and confirmed.
            if let Some(limit) = self.script.close_after_visits {
                if present && inner.visits >= limit {
                    inner.closed = true;
                }
            }
            return Ok(handle);
        }

        let element = match inner.location {
            Location::Detail(index) => self.script.listings.get(index).and_then(|listing| {
                catalog
                    .iter()
                    .find_map(|selector| Self::element_for_selector(listing, selector))
            }),
            _ => None,
        };
        Ok(element.map(|element| Self::store_element(&mut inner, element)))
    }

    async fn read_text(&self, handle: ElementHandle) -> Result<Option<String>, DriverError> {
        let inner = self.inner.lock().unwrap();
        let element = inner
            .elements
            .get(&handle.0)
            .ok_or(DriverError::StaleHandle)?;
        Ok(element.text.clone())
    }

    async fn read_attribute(
        &self,
        handle: ElementHandle,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        let inner = self.inner.lock().unwrap();
        let element = inner
            .elements
            .get(&handle.0)
            .ok_or(DriverError::StaleHandle)?;
        Ok(element.attrs.get(name).cloned())
    }
}

/// 模拟驱动工厂
///
/// 每次创建按同一脚本实例化新驱动，统计对象共享
pub struct MockDriverFactory {
    script: MockScript,
    pub stats: Arc<MockStats>,
}

impl MockDriverFactory {
    pub fn new(script: MockScript) -> Self {
        Self {
            script,
            stats: Arc::new(MockStats::default()),
        }
    }
}

#[async_trait]
impl DriverFactory for MockDriverFactory {
    async fn create(&self) -> Result<Box<dyn PageDriver>, DriverError> {
        Ok(Box::new(MockDriver::new(
            self.script.clone(),
            self.stats.clone(),
        )))
    }
}
