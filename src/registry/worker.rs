// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::config::settings::ScraperSettings;
use crate::domain::models::business::BusinessRecord;
use crate::domain::models::task::ScrapeTask;
use crate::domain::services::dedup::DuplicateFilter;
use crate::driver::DriverFactory;
use crate::navigation::{NavigationController, RecordOutcome, RecordSink, RunReport};
use crate::store::{RecordStore, StoreError};

/// 任务工作器
///
/// 每个任务一个工作器，独占驱动实例，结束时将任务置为终止状态
pub struct TaskWorker;

impl TaskWorker {
    #[instrument(skip_all, fields(task_id = %task.read().id))]
    pub async fn run(
        task: Arc<RwLock<ScrapeTask>>,
        settings: ScraperSettings,
        factory: Arc<dyn DriverFactory>,
        store: Arc<dyn RecordStore>,
    ) {
        let (id, query, max_results) = {
            let task = task.read();
            (task.id, task.query.clone(), task.max_results)
        };

        if let Err(e) = task.write().start() {
            error!(task_id = %id, error = %e, "failed to start task");
            return;
        }
        info!(task_id = %id, %query, "worker started");

        let driver = match factory.create().await {
            Ok(driver) => driver,
            Err(e) => {
                warn!(task_id = %id, error = %e, "failed to create page driver");
                Self::finish_failed(&task, format!("failed to start browser: {}", e));
                return;
            }
        };

        let controller = NavigationController::new(settings, query.clone(), max_results);
        let mut sink = RegistrySink {
            task: task.clone(),
            store,
            filter: DuplicateFilter::new(query),
        };

        match controller.run(driver.as_ref(), &mut sink).await {
            Ok(report) => Self::finish(&task, id, report),
            Err(e) => {
                warn!(task_id = %id, error = %e, "worker failed");
                Self::finish_failed(&task, e.to_string());
            }
        }
    }

    fn finish(task: &Arc<RwLock<ScrapeTask>>, id: uuid::Uuid, report: RunReport) {
        match report.aborted {
            None => {
                if let Err(e) = task.write().complete(None) {
                    error!(task_id = %id, error = %e, "failed to complete task");
                }
                info!(task_id = %id, accepted = report.accepted, "task completed");
            }
            Some(reason) if report.accepted > 0 => {
                // Records gathered before the abort are kept and the task is
                // reported as completed with a notice, not as failed.
                let notice = format!("partial results: {}", reason);
                if let Err(e) = task.write().complete(Some(notice)) {
                    error!(task_id = %id, error = %e, "failed to complete task");
                }
                info!(
                    task_id = %id,
                    accepted = report.accepted,
                    %reason,
                    "task completed with partial results"
                );
            }
            Some(reason) => {
                Self::finish_failed(task, reason.to_string());
                info!(task_id = %id, %reason, "task failed without results");
            }
        }
    }

    fn finish_failed(task: &Arc<RwLock<ScrapeTask>>, error: String) {
        let mut task = task.write();
        let id = task.id;
        if let Err(e) = task.fail(error) {
            error!(task_id = %id, error = %e, "failed to mark task as failed");
        }
    }
}

/// 注册表侧的记录接收器
///
/// 在接受路径上完成去重判定、存储写入与任务进度推进
struct RegistrySink {
    task: Arc<RwLock<ScrapeTask>>,
    store: Arc<dyn RecordStore>,
    filter: DuplicateFilter,
}

#[async_trait]
impl RecordSink for RegistrySink {
    async fn accept(&mut self, record: BusinessRecord) -> anyhow::Result<RecordOutcome> {
        if self.filter.is_duplicate(&record, self.store.as_ref()).await? {
            info!(name = %record.name, "duplicate record filtered");
            self.task.write().duplicates_found += 1;
            return Ok(RecordOutcome::Duplicate);
        }
        self.filter.remember(&record);

        match self.store.insert(record.clone()).await {
            // A concurrent task already stored an equivalent record; the
            // current task still counts it as its own result.
            Ok(()) | Err(StoreError::Conflict) => {}
            Err(e) => return Err(e.into()),
        }

        self.task.write().push_record(record);
        Ok(RecordOutcome::Accepted)
    }
}
