// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 提取模块
//!
//! 将详情页内容转换为结构化商家记录

pub mod pipeline;

pub use pipeline::ExtractionPipeline;
