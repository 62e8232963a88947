// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 联系方式类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactKind {
    /// 普通电话号码
    Phone,
    /// 即时通讯链接解析出的电话
    Messaging,
    /// 电子邮件
    Email,
    /// 社交主页
    Social,
    /// 校验失败，丢弃
    Unknown,
}

impl fmt::Display for ContactKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ContactKind::Phone => write!(f, "phone"),
            ContactKind::Messaging => write!(f, "messaging"),
            ContactKind::Email => write!(f, "email"),
            ContactKind::Social => write!(f, "social"),
            ContactKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// 联系方式候选
///
/// 分类器的中间产物，仅在分类流水线内部产生和消费，不做持久化
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactCandidate {
    /// 原始字符串
    pub raw: String,
    /// 推断出的类别
    pub kind: ContactKind,
    /// 规范化后的值
    pub normalized: String,
}

impl ContactCandidate {
    /// 构造一个校验失败的候选
    pub fn rejected(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            kind: ContactKind::Unknown,
            normalized: String::new(),
        }
    }

    /// 候选是否通过校验
    pub fn is_valid(&self) -> bool {
        self.kind != ContactKind::Unknown
    }
}
