// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 搜索结果缓存、持久化与向量索引协作方
pub mod cache_repository;
pub mod job_repository;

pub use cache_repository::{CacheError, CacheStats, JobCache};
pub use job_repository::{JobIndex, JobStore};
