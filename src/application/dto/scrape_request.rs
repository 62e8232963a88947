// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// 抓取任务创建请求数据传输对象
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct ScrapeRequestDto {
    /// 搜索查询，例如 "plomero, caba"
    #[validate(length(min = 1, message = "search query cannot be empty"))]
    pub search_query: String,
    /// 期望的最大结果数，缺省由服务端决定
    pub max_results: Option<u32>,
}
