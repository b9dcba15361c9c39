// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 该模块包含系统的技术实现细节，依赖于领域层的抽象接口。
///
/// 包含的子模块：
/// - 聚合源（aggregators）：多雇主职位聚合 API
/// - 缓存（cache）：搜索结果的文件与内存缓存
/// - 仓库实现（repositories）：职位持久化
/// - 抽取策略（strategies）：按站点定制的职位抽取逻辑
pub mod aggregators;
pub mod cache;
pub mod repositories;
pub mod strategies;
