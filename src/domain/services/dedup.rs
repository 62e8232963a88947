// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashSet;
use tracing::debug;

use crate::domain::models::business::BusinessRecord;
use crate::store::{RecordStore, StoreError};

/// 去重过滤器
///
/// 任务内维护已见 (名称, 电话) 与 (名称, 网站主机) 组合，
/// 并在接受记录前查询存储层判断同查询下是否已存在。
/// 判重规则：名称相同且（电话相同或网站主机相同）。
pub struct DuplicateFilter {
    query: String,
    seen_name_phone: HashSet<(String, String)>,
    seen_name_host: HashSet<(String, String)>,
}

impl DuplicateFilter {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            seen_name_phone: HashSet::new(),
            seen_name_host: HashSet::new(),
        }
    }

    /// 判断记录是否为重复
    ///
    /// 先查本任务已见集合，再查存储层；存储层不可用时按错误上抛，
    /// 由调用方决定是否降级处理。
    pub async fn is_duplicate(
        &self,
        record: &BusinessRecord,
        store: &dyn RecordStore,
    ) -> Result<bool, StoreError> {
        let name = record.normalized_name();
        let phone = record.normalized_phone();
        let host = record.website_host();

        if let Some(phone) = &phone {
            if self.seen_name_phone.contains(&(name.clone(), phone.clone())) {
                debug!(name = %record.name, "duplicate within task by name+phone");
                return Ok(true);
            }
        }
        if let Some(host) = &host {
            if self.seen_name_host.contains(&(name.clone(), host.clone())) {
                debug!(name = %record.name, "duplicate within task by name+host");
                return Ok(true);
            }
        }

        let exists = store
            .exists(&self.query, &name, phone.as_deref(), host.as_deref())
            .await?;
        if exists {
            debug!(name = %record.name, "duplicate against stored records");
        }
        Ok(exists)
    }

    /// 登记一条已接受的记录
    pub fn remember(&mut self, record: &BusinessRecord) {
        let name = record.normalized_name();
        if let Some(phone) = record.normalized_phone() {
            self.seen_name_phone.insert((name.clone(), phone));
        }
        if let Some(host) = record.website_host() {
            self.seen_name_host.insert((name, host));
        }
    }
}
