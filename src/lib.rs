// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// API请求与领域模型之间的数据传输对象
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含核心业务实体和领域服务（联系方式分类、去重）
pub mod domain;

/// 驱动模块
///
/// 浏览器自动化驱动能力的抽象与实现
pub mod driver;

/// 提取模块
///
/// 基于有序选择器回退列表的字段提取流水线
pub mod extraction;

/// 导航模块
///
/// 列表页/详情页导航状态机及恢复策略
pub mod navigation;

/// 表示层模块
///
/// 处理HTTP请求和响应，包括路由、处理器和错误映射
pub mod presentation;

/// 任务注册表模块
///
/// 管理抓取任务的生命周期及其专属工作器
pub mod registry;

/// 记录存储模块
///
/// 外部记录存储契约及内存实现
pub mod store;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;
