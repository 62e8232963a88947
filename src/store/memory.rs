// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::models::business::BusinessRecord;
use crate::store::{RecordStore, StoreError};

/// 内存记录存储
///
/// 按来源查询分桶，进程生命周期内有效
#[derive(Default)]
pub struct MemoryRecordStore {
    records: DashMap<String, Vec<BusinessRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn matches(record: &BusinessRecord, name: &str, phone: Option<&str>, host: Option<&str>) -> bool {
        if record.normalized_name() != name {
            return false;
        }
        let phone_match = match (record.normalized_phone(), phone) {
            (Some(existing), Some(incoming)) => existing == incoming,
            _ => false,
        };
        let host_match = match (record.website_host(), host) {
            (Some(existing), Some(incoming)) => existing == incoming,
            _ => false,
        };
        phone_match || host_match
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn exists(
        &self,
        query: &str,
        name: &str,
        phone: Option<&str>,
        host: Option<&str>,
    ) -> Result<bool, StoreError> {
        let found = self
            .records
            .get(query)
            .map(|bucket| {
                bucket
                    .iter()
                    .any(|record| Self::matches(record, name, phone, host))
            })
            .unwrap_or(false);
        Ok(found)
    }

    async fn insert(&self, record: BusinessRecord) -> Result<(), StoreError> {
        let mut bucket = self.records.entry(record.source_query.clone()).or_default();
        let name = record.normalized_name();
        let phone = record.normalized_phone();
        let host = record.website_host();

        if bucket
            .iter()
            .any(|existing| Self::matches(existing, &name, phone.as_deref(), host.as_deref()))
        {
            return Err(StoreError::Conflict);
        }
        bucket.push(record);
        Ok(())
    }
}
