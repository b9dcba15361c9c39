// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含职位模型、雇主目录、抓取契约与搜索服务
pub mod domain;

/// 引擎模块
///
/// HTTP 与无头浏览器引擎，以及抽取策略注册表
pub mod engines;

/// 基础设施模块
///
/// 具体的抽取策略、聚合源、缓存与持久化实现
pub mod infrastructure;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;
