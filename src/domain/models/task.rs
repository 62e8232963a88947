// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::models::business::BusinessRecord;

/// 抓取任务实体
///
/// 表示一次针对单个搜索查询的商家信息抓取。任务由注册表独占持有，
/// 仅由绑定该任务的工作器修改，状态轮询方通过快照副本并发读取。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeTask {
    /// 任务唯一标识符
    pub id: Uuid,
    /// 搜索查询
    pub query: String,
    /// 请求的最大结果数
    pub max_results: u32,
    /// 任务状态，跟踪任务在其生命周期中的当前阶段
    pub status: TaskStatus,
    /// 进度计数，等于已接受记录数，单调不减
    pub progress: u32,
    /// 被去重过滤器拦截的记录数
    pub duplicates_found: u32,
    /// 已接受的商家记录，按访问顺序追加
    pub results: Vec<BusinessRecord>,
    /// 错误详情；Failed 时必有，部分结果完成时携带提示
    pub error: Option<String>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 开始执行时间
    pub started_at: Option<DateTime<Utc>>,
    /// 结束时间
    pub finished_at: Option<DateTime<Utc>>,
}

/// 任务状态枚举
///
/// 状态转换遵循以下流程：
/// Pending → Running → Completed/Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// 已创建，工作器尚未开始执行
    #[default]
    Pending,
    /// 工作器正在执行
    Running,
    /// 已完成（含携带部分结果提示的降级完成）
    Completed,
    /// 已失败，未收集到任何记录
    Failed,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Running => write!(f, "running"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for TaskStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "running" => Ok(TaskStatus::Running),
            "completed" => Ok(TaskStatus::Completed),
            "failed" => Ok(TaskStatus::Failed),
            _ => Err(()),
        }
    }
}

/// 领域错误类型
#[derive(Error, Debug)]
pub enum DomainError {
    /// 无效的状态转换，当任务状态转换不符合业务规则时发生
    #[error("Invalid state transition")]
    InvalidStateTransition,
}

impl ScrapeTask {
    /// 创建一个新的抓取任务
    pub fn new(query: String, max_results: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            query,
            max_results,
            status: TaskStatus::Pending,
            progress: 0,
            duplicates_found: 0,
            results: Vec::new(),
            error: None,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }

    /// 启动任务
    ///
    /// 将任务状态从 Pending 变更为 Running
    pub fn start(&mut self) -> Result<(), DomainError> {
        match self.status {
            TaskStatus::Pending => {
                self.status = TaskStatus::Running;
                self.started_at = Some(Utc::now());
                Ok(())
            }
            _ => Err(DomainError::InvalidStateTransition),
        }
    }

    /// 完成任务
    ///
    /// `partial_notice` 非空表示任务以部分结果降级完成，
    /// 提示通过 error 字段传递给轮询方而非作为失败。
    pub fn complete(&mut self, partial_notice: Option<String>) -> Result<(), DomainError> {
        match self.status {
            TaskStatus::Running => {
                self.status = TaskStatus::Completed;
                self.error = partial_notice;
                self.finished_at = Some(Utc::now());
                Ok(())
            }
            _ => Err(DomainError::InvalidStateTransition),
        }
    }

    /// 标记任务失败
    pub fn fail(&mut self, error: String) -> Result<(), DomainError> {
        match self.status {
            TaskStatus::Pending | TaskStatus::Running => {
                self.status = TaskStatus::Failed;
                self.error = Some(error);
                self.finished_at = Some(Utc::now());
                Ok(())
            }
            _ => Err(DomainError::InvalidStateTransition),
        }
    }

    /// 追加一条已接受的记录并推进进度
    ///
    /// 记录一经追加即不可变；进度与结果数在同一次修改内提交，
    /// 保证快照读取方观察到 progress ≤ results.len()。
    pub fn push_record(&mut self, record: BusinessRecord) {
        self.results.push(record);
        self.progress = self.results.len() as u32;
    }

    /// 生成一致性快照
    pub fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot {
            task_id: self.id,
            status: self.status,
            progress: self.progress,
            total_found: self.results.len() as u32,
            duplicates_found: self.duplicates_found,
            search_query: self.query.clone(),
            max_results: self.max_results,
            results: self.results.clone(),
            error: self.error.clone(),
            start_time: self.created_at,
            end_time: self.finished_at,
            duration_secs: self
                .finished_at
                .map(|end| (end - self.created_at).num_seconds()),
        }
    }
}

/// 任务状态快照
///
/// 状态轮询返回的只读视图，与工作器的后续修改解耦
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub task_id: Uuid,
    pub status: TaskStatus,
    pub progress: u32,
    pub total_found: u32,
    pub duplicates_found: u32,
    pub search_query: String,
    pub max_results: u32,
    pub results: Vec<BusinessRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<i64>,
}
