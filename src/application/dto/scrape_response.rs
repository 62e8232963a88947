// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::models::business::BusinessRecord;

/// 任务创建响应数据传输对象
#[derive(Debug, Serialize, Deserialize)]
pub struct ScrapeCreatedDto {
    /// 新建任务的标识符
    pub task_id: Uuid,
    /// 创建时的任务状态
    pub status: String,
}

/// 结果下载响应数据传输对象
#[derive(Debug, Serialize, Deserialize)]
pub struct DownloadDto {
    /// 任务标识符
    pub task_id: Uuid,
    /// 来源搜索查询
    pub search_query: String,
    /// 结果总数
    pub total_found: u32,
    /// 商家记录列表
    pub results: Vec<BusinessRecord>,
}
