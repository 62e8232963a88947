// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 任务注册表模块
//!
//! 持有所有抓取任务，负责创建校验、工作器派发与状态查询

use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::config::settings::ScraperSettings;
use crate::domain::models::task::{ScrapeTask, TaskSnapshot, TaskStatus};
use crate::driver::DriverFactory;
use crate::store::RecordStore;

pub mod worker;

/// 注册表错误类型
#[derive(Error, Debug)]
pub enum RegistryError {
    /// 请求参数无效
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// 任务不存在
    #[error("Task not found")]
    NotFound,
    /// 任务尚未完成，结果不可下载
    #[error("Task is not completed yet")]
    NotReady,
}

/// 任务注册表
///
/// 每个任务由独立的工作器执行，注册表本身只做并发安全的登记与查询
pub struct TaskRegistry {
    tasks: DashMap<Uuid, Arc<RwLock<ScrapeTask>>>,
    settings: ScraperSettings,
    factory: Arc<dyn DriverFactory>,
    store: Arc<dyn RecordStore>,
}

impl TaskRegistry {
    pub fn new(
        settings: ScraperSettings,
        factory: Arc<dyn DriverFactory>,
        store: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            tasks: DashMap::new(),
            settings,
            factory,
            store,
        }
    }

    /// 创建任务并派发工作器
    pub fn create(&self, query: &str, max_results: u32) -> Result<Uuid, RegistryError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RegistryError::InvalidArgument(
                "search query must not be empty".to_string(),
            ));
        }
        let limit = self.settings.max_results_limit;
        if max_results == 0 || max_results > limit {
            return Err(RegistryError::InvalidArgument(format!(
                "max_results must be between 1 and {}",
                limit
            )));
        }

        let task = ScrapeTask::new(query.to_string(), max_results);
        let id = task.id;
        let task = Arc::new(RwLock::new(task));
        self.tasks.insert(id, task.clone());

        info!(task_id = %id, %query, max_results, "scrape task created");

        let settings = self.settings.clone();
        let factory = self.factory.clone();
        let store = self.store.clone();
        tokio::spawn(async move {
            worker::TaskWorker::run(task, settings, factory, store).await;
        });

        Ok(id)
    }

    /// 查询任务状态快照
    pub fn status(&self, id: Uuid) -> Result<TaskSnapshot, RegistryError> {
        let task = self.tasks.get(&id).ok_or(RegistryError::NotFound)?;
        let snapshot = task.read().snapshot();
        Ok(snapshot)
    }

    /// 下载已完成任务的结果
    pub fn download(&self, id: Uuid) -> Result<TaskSnapshot, RegistryError> {
        let task = self.tasks.get(&id).ok_or(RegistryError::NotFound)?;
        let snapshot = task.read().snapshot();
        if snapshot.status != TaskStatus::Completed {
            return Err(RegistryError::NotReady);
        }
        Ok(snapshot)
    }
}
