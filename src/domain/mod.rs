// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 雇主目录（catalog）：雇主到抓取目标的静态映射
/// - 领域模型（models）：职位记录、搜索请求与缓存条目
/// - 仓库接口（repositories）：缓存与持久化抽象接口
/// - 抓取契约（scraping）：抽取策略与聚合源接口
/// - 服务（services）：匹配、编排与搜索
///
/// 领域层不依赖于任何外部实现。
pub mod catalog;
pub mod models;
pub mod repositories;
pub mod scraping;
pub mod services;
