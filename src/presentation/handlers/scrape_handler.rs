// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    application::dto::{
        scrape_request::ScrapeRequestDto,
        scrape_response::{DownloadDto, ScrapeCreatedDto},
    },
    presentation::errors::AppError,
    registry::TaskRegistry,
};

/// 未指定 max_results 时的默认值
const DEFAULT_MAX_RESULTS: u32 = 20;

/// 创建抓取任务
///
/// 校验请求后立即返回任务标识符，抓取在后台工作器中执行
pub async fn create_task(
    Extension(registry): Extension<Arc<TaskRegistry>>,
    Json(payload): Json<ScrapeRequestDto>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(errors) = payload.validate() {
        return Err(AppError::from(anyhow::anyhow!(
            "Validation error: {}",
            errors
        )));
    }

    let max_results = payload.max_results.unwrap_or(DEFAULT_MAX_RESULTS);
    let task_id = registry.create(&payload.search_query, max_results)?;

    info!(%task_id, query = %payload.search_query, "scrape task accepted");

    Ok((
        StatusCode::OK,
        Json(ScrapeCreatedDto {
            task_id,
            status: "started".to_string(),
        }),
    ))
}

/// 查询任务状态
///
/// 返回包含进度、重复计数与已接受结果的一致性快照
pub async fn task_status(
    Extension(registry): Extension<Arc<TaskRegistry>>,
    Path(task_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let snapshot = registry.status(task_id)?;
    Ok(Json(snapshot))
}

/// 下载已完成任务的结果
///
/// 任务未完成时返回冲突状态，轮询方应继续等待
pub async fn download_results(
    Extension(registry): Extension<Arc<TaskRegistry>>,
    Path(task_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let snapshot = registry.download(task_id)?;
    Ok(Json(DownloadDto {
        task_id: snapshot.task_id,
        search_query: snapshot.search_query,
        total_found: snapshot.total_found,
        results: snapshot.results,
    }))
}
