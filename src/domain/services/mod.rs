// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 领域服务模块
//!
//! 包含联系方式分类与记录去重等纯领域逻辑

pub mod classifier;
pub mod dedup;
