// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::domain::models::contact::{ContactCandidate, ContactKind};

/// 即时通讯链接的已知主机
const MESSAGING_HOSTS: [&str; 3] = ["wa.me", "api.whatsapp.com", "whatsapp.com"];

/// 即时通讯URL中电话参数的提取模式，按优先级排列
static MESSAGING_PHONE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // api.whatsapp.com with query params
        Regex::new(r"(?i)https?://api\.whatsapp\.com/send[/?]*\??(?:.*[?&])?phone=(\+?\d+)").unwrap(),
        // wa.me with phone in path
        Regex::new(r"(?i)https?://wa\.me/(\+?\d+)").unwrap(),
        // Generic phone parameter (fallback)
        Regex::new(r"(?i)[?&]phone=(\+?\d+)").unwrap(),
        // Phone parameter without query marker (sometimes in buttons)
        Regex::new(r"(?i)phone[=:](\+?\d+)").unwrap(),
    ]
});

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

static SOCIAL_PROFILE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)https?://(?:www\.)?instagram\.com/([A-Za-z0-9_.]+)").unwrap());

/// 联系方式分类器
///
/// 纯函数流水线：将原始字符串或URL转换为带类别的规范化联系方式，
/// 并解决"电话"与"即时通讯链接电话"之间的歧义。
pub struct ContactClassifier;

impl ContactClassifier {
    /// 对电话类原始值进行分类
    ///
    /// 原始值若是已知即时通讯主机的URL，则解码后提取内嵌电话参数，
    /// 否则整体按电话数字序列处理。规范化后仅接受10–15位数字，
    /// 其余分类为 Unknown 并由调用方丢弃。
    pub fn classify(raw: &str) -> ContactCandidate {
        let lowered = raw.to_lowercase();
        if MESSAGING_HOSTS.iter().any(|host| lowered.contains(host)) {
            return match Self::messaging_phone_from_url(raw) {
                Some(digits) => ContactCandidate {
                    raw: raw.to_string(),
                    kind: ContactKind::Messaging,
                    normalized: digits,
                },
                None => ContactCandidate::rejected(raw),
            };
        }

        match Self::normalize_digits(raw) {
            Some(digits) => ContactCandidate {
                raw: raw.to_string(),
                kind: ContactKind::Phone,
                normalized: digits,
            },
            None => ContactCandidate::rejected(raw),
        }
    }

    /// 按标准地址形状校验电子邮件候选
    pub fn classify_email(raw: &str) -> ContactCandidate {
        let trimmed = raw.trim();
        if EMAIL_PATTERN.is_match(trimmed) {
            ContactCandidate {
                raw: raw.to_string(),
                kind: ContactKind::Email,
                normalized: trimmed.to_lowercase(),
            }
        } else {
            ContactCandidate::rejected(raw)
        }
    }

    /// 按已知主页主机模式校验社交链接候选
    ///
    /// 规范化为 `https://instagram.com/{username}` 形式
    pub fn classify_social(raw: &str) -> ContactCandidate {
        match SOCIAL_PROFILE_PATTERN.captures(raw.trim()) {
            Some(caps) => {
                let username = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
                if username.is_empty() {
                    return ContactCandidate::rejected(raw);
                }
                ContactCandidate {
                    raw: raw.to_string(),
                    kind: ContactKind::Social,
                    normalized: format!("https://instagram.com/{}", username),
                }
            }
            None => ContactCandidate::rejected(raw),
        }
    }

    /// 折叠单个详情页内的候选集合
    ///
    /// 同一 (类别, 规范值) 只保留首个出现的候选；
    /// 规范值与某个 messaging 候选相同的普通电话候选被让位，
    /// 即时通讯链接的存在优先于普通电话定位器。
    pub fn collapse(candidates: Vec<ContactCandidate>) -> Vec<ContactCandidate> {
        let messaging_values: HashSet<String> = candidates
            .iter()
            .filter(|c| c.kind == ContactKind::Messaging)
            .map(|c| c.normalized.clone())
            .collect();

        let mut seen: HashSet<(ContactKind, String)> = HashSet::new();
        let mut collapsed = Vec::new();

        for candidate in candidates {
            if !candidate.is_valid() {
                continue;
            }
            if candidate.kind == ContactKind::Phone
                && messaging_values.contains(&candidate.normalized)
            {
                continue;
            }
            if seen.insert((candidate.kind, candidate.normalized.clone())) {
                collapsed.push(candidate);
            }
        }

        collapsed
    }

    /// 从即时通讯URL中提取内嵌电话
    ///
    /// 先做URL解码以处理 %2B 等转义，再按模式顺序匹配
    fn messaging_phone_from_url(url: &str) -> Option<String> {
        let decoded = urlencoding::decode(url)
            .map(|cow| cow.into_owned())
            .unwrap_or_else(|_| url.to_string());

        for pattern in MESSAGING_PHONE_PATTERNS.iter() {
            if let Some(caps) = pattern.captures(&decoded) {
                if let Some(digits) = caps.get(1).and_then(|m| Self::normalize_digits(m.as_str())) {
                    return Some(digits);
                }
            }
        }
        None
    }

    /// 剥离非数字字符并校验长度窗口
    ///
    /// 去掉前导加号后要求10–15位数字
    fn normalize_digits(raw: &str) -> Option<String> {
        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
        if (10..=15).contains(&digits.len()) {
            Some(digits)
        } else {
            None
        }
    }
}
