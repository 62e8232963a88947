// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 商家记录实体
pub mod business;

/// 联系方式候选实体
pub mod contact;

/// 抓取任务实体
pub mod task;
