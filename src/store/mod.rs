// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 记录存储模块
//!
//! 任务结果之外的跨任务记录存储，供去重过滤器查询

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::business::BusinessRecord;

pub mod memory;

pub use memory::MemoryRecordStore;

/// 存储错误类型
#[derive(Error, Debug)]
pub enum StoreError {
    /// 等价记录已存在；对接受流程而言是良性结果
    #[error("Record already present")]
    Conflict,
    /// 存储不可用
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// 记录存储特质
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// 判断同一查询下是否已存在等价记录
    ///
    /// 等价定义：规范化名称相同，且规范化电话或网站主机相同
    async fn exists(
        &self,
        query: &str,
        name: &str,
        phone: Option<&str>,
        host: Option<&str>,
    ) -> Result<bool, StoreError>;

    /// 插入一条记录
    ///
    /// 等价记录已存在时返回 `Conflict`
    async fn insert(&self, record: BusinessRecord) -> Result<(), StoreError>;
}
