// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::domain::models::business::BusinessRecord;
use crate::domain::models::contact::{ContactCandidate, ContactKind};
use crate::domain::services::classifier::ContactClassifier;
use crate::driver::selectors::{self, Selector};
use crate::driver::{DriverError, PageDriver};

/// 详情页顶部的通用标题，命中时视为未取得名称
const GENERIC_HEADINGS: [&str; 4] = ["resultados", "results", "google maps", "maps"];

static RATING_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+[.,]\d+)").unwrap());

static REVIEWS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s+(?:opiniones?|reviews?)").unwrap());

/// 详情页提取流水线
///
/// 每个字段按选择器目录逐个回退查找，单个字段缺失只降级不报错；
/// 仅名称为必填项，取不到名称的详情页整体跳过。
pub struct ExtractionPipeline;

impl ExtractionPipeline {
    pub fn new() -> Self {
        Self
    }

    /// 从当前详情页提取一条商家记录
    ///
    /// 返回 `Ok(None)` 表示页面有效但无法取得名称；
    /// 仅会话级故障以错误形式上抛。
    pub async fn extract(
        &self,
        driver: &dyn PageDriver,
        query: &str,
    ) -> Result<Option<BusinessRecord>, DriverError> {
        let name = match self.extract_name(driver).await? {
            Some(name) => name,
            None => {
                warn!("listing has no usable business name, skipping");
                return Ok(None);
            }
        };
        debug!(%name, "extracting listing fields");

        let mut candidates: Vec<ContactCandidate> = Vec::new();

        if let Some(text) = self.read_first_text(driver, selectors::PHONE_TEXT).await? {
            candidates.push(ContactClassifier::classify(&text));
        }
        if let Some(href) = self
            .read_first_attribute(driver, selectors::PHONE_TEL, "href")
            .await?
        {
            let raw = href.strip_prefix("tel:").unwrap_or(&href);
            candidates.push(ContactClassifier::classify(raw));
        }
        if let Some(href) = self
            .read_first_attribute(driver, selectors::MESSAGING, "href")
            .await?
        {
            candidates.push(ContactClassifier::classify(&href));
        }
        if let Some(href) = self
            .read_first_attribute(driver, selectors::EMAIL, "href")
            .await?
        {
            let raw = href.strip_prefix("mailto:").unwrap_or(&href);
            candidates.push(ContactClassifier::classify_email(raw));
        }
        if let Some(href) = self
            .read_first_attribute(driver, selectors::SOCIAL, "href")
            .await?
        {
            candidates.push(ContactClassifier::classify_social(&href));
        }

        let contacts = ContactClassifier::collapse(candidates);
        let pick = |kind: ContactKind| {
            contacts
                .iter()
                .find(|c| c.kind == kind)
                .map(|c| c.normalized.clone())
        };

        let phone = pick(ContactKind::Phone);
        if phone.is_none() {
            warn!(%name, "listing has no phone number");
        }

        let website = self.extract_website(driver).await?;
        let address = self.extract_address(driver).await?;
        let (rating, reviews) = self.extract_rating(driver).await?;

        Ok(Some(BusinessRecord {
            name,
            phone,
            website,
            email: pick(ContactKind::Email),
            address,
            rating,
            reviews,
            social_profile: pick(ContactKind::Social),
            messaging_phone: pick(ContactKind::Messaging),
            source_query: query.to_string(),
            scraped_at: Utc::now(),
        }))
    }

    async fn extract_name(&self, driver: &dyn PageDriver) -> Result<Option<String>, DriverError> {
        let text = match self.read_first_text(driver, selectors::NAME).await? {
            Some(text) => text,
            None => return Ok(None),
        };
        let name = text.trim().to_string();
        if name.is_empty() || GENERIC_HEADINGS.contains(&name.to_lowercase().as_str()) {
            return Ok(None);
        }
        Ok(Some(name))
    }

    async fn extract_website(
        &self,
        driver: &dyn PageDriver,
    ) -> Result<Option<String>, DriverError> {
        let href = match self
            .read_first_attribute(driver, selectors::WEBSITE, "href")
            .await?
        {
            Some(href) => href,
            None => return Ok(None),
        };
        if href.starts_with("javascript:") || href.contains("google") {
            return Ok(None);
        }
        Ok(Some(href))
    }

    async fn extract_address(
        &self,
        driver: &dyn PageDriver,
    ) -> Result<Option<String>, DriverError> {
        let text = match self.read_first_text(driver, selectors::ADDRESS).await? {
            Some(text) => text,
            None => return Ok(None),
        };
        Ok(plausible_address(&text))
    }

    async fn extract_rating(
        &self,
        driver: &dyn PageDriver,
    ) -> Result<(Option<String>, Option<u32>), DriverError> {
        for selector in selectors::RATING {
            let handle = match driver.find_first(std::slice::from_ref(selector)).await? {
                Some(handle) => handle,
                None => continue,
            };
            if let Some(label) = driver.read_attribute(handle, "aria-label").await? {
                if !label.trim().is_empty() {
                    return Ok(parse_rating_label(&label));
                }
            }
            if let Some(text) = driver.read_text(handle).await? {
                if !text.trim().is_empty() {
                    let (rating, _) = parse_rating_label(&text);
                    return Ok((rating, None));
                }
            }
        }
        Ok((None, None))
    }

    /// 按目录顺序逐个探测选择器，接受第一个取得非空文本的元素。
    /// 元素存在但内容为空时继续回退，而不是遮蔽低优先级选择器。
    async fn read_first_text(
        &self,
        driver: &dyn PageDriver,
        catalog: &[Selector],
    ) -> Result<Option<String>, DriverError> {
        for selector in catalog {
            let handle = match driver.find_first(std::slice::from_ref(selector)).await? {
                Some(handle) => handle,
                None => continue,
            };
            if let Some(text) = driver.read_text(handle).await? {
                if !text.trim().is_empty() {
                    return Ok(Some(text));
                }
            }
        }
        Ok(None)
    }

    async fn read_first_attribute(
        &self,
        driver: &dyn PageDriver,
        catalog: &[Selector],
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        for selector in catalog {
            let handle = match driver.find_first(std::slice::from_ref(selector)).await? {
                Some(handle) => handle,
                None => continue,
            };
            if let Some(value) = driver.read_attribute(handle, name).await? {
                if !value.trim().is_empty() {
                    return Ok(Some(value));
                }
            }
        }
        Ok(None)
    }
}

impl Default for ExtractionPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// 从评分元素的 aria-label 解析评分与评论数
///
/// 例如 "4,5 estrellas 123 opiniones" 解析为 ("4.5", 123)，
/// 小数逗号统一为小数点
pub fn parse_rating_label(label: &str) -> (Option<String>, Option<u32>) {
    let rating = RATING_PATTERN
        .captures(label)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().replace(',', "."));
    let reviews = REVIEWS_PATTERN
        .captures(label)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok());
    (rating, reviews)
}

/// 地址文本的合理性过滤
///
/// 要求包含数字、长度超过10个字符且不是电话行
fn plausible_address(text: &str) -> Option<String> {
    let trimmed = text.trim();
    let lowered = trimmed.to_lowercase();
    if trimmed.len() > 10
        && trimmed.chars().any(|c| c.is_ascii_digit())
        && !lowered.starts_with("tel")
        && !lowered.starts_with("phone")
    {
        Some(trimmed.to_string())
    } else {
        None
    }
}
