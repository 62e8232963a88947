// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// 商家记录
///
/// 从单个详情页提取的结构化商家信息。
/// 一经追加到任务结果序列即视为不可变。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessRecord {
    /// 商家名称（必填）
    pub name: String,
    /// 电话号码，规范化数字形式
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// 网站URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// 电子邮件，本阶段通常缺失
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// 地址
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// 评分，十进制字符串
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    /// 评论数
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews: Option<u32>,
    /// 社交主页URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_profile: Option<String>,
    /// 即时通讯链接解析出的电话，规范化形式
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messaging_phone: Option<String>,
    /// 来源搜索查询
    pub source_query: String,
    /// 提取时间
    pub scraped_at: DateTime<Utc>,
}

impl BusinessRecord {
    /// 规范化名称，用于去重比较
    pub fn normalized_name(&self) -> String {
        self.name.trim().to_lowercase()
    }

    /// 规范化电话，用于去重比较
    pub fn normalized_phone(&self) -> Option<String> {
        self.phone.as_deref().and_then(normalize_phone)
    }

    /// 网站主机名的规范化形式，用于去重比较
    pub fn website_host(&self) -> Option<String> {
        self.website.as_deref().and_then(normalize_host)
    }
}

/// 规范化电话号码
///
/// 仅保留数字并去掉前导加号；少于8位视为无效
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() >= 8 {
        Some(digits)
    } else {
        None
    }
}

/// 规范化网站主机名
///
/// 小写、去掉 www. 前缀；无法解析或过短时视为无效
pub fn normalize_host(raw: &str) -> Option<String> {
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    };

    let host = match Url::parse(&candidate) {
        Ok(url) => url.host_str()?.to_lowercase(),
        Err(_) => return None,
    };

    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
    if host.len() > 3 {
        Some(host)
    } else {
        None
    }
}
