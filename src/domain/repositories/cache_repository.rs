// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::domain::models::{CacheFingerprint, JobRecord};

/// 缓存错误类型
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("缓存IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("缓存序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 缓存统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entry_count: usize,
    pub total_size_bytes: u64,
    /// 已过期但尚未清理的条目
    pub expired_count: usize,
    pub ttl_hours: u64,
}

/// 搜索结果缓存
///
/// 以请求指纹为键；过期条目在读取时视为未命中并被删除
#[async_trait]
pub trait JobCache: Send + Sync {
    /// 读取未过期的缓存结果
    async fn get(&self, fingerprint: &CacheFingerprint) -> Result<Option<Vec<JobRecord>>, CacheError>;

    /// 写入结果（整体覆盖，后写者胜）
    async fn put(&self, fingerprint: &CacheFingerprint, jobs: &[JobRecord]) -> Result<(), CacheError>;

    /// 删除所有过期或损坏的条目，返回删除数量
    async fn sweep(&self) -> Result<usize, CacheError>;

    /// 删除全部条目，返回删除数量
    async fn clear(&self) -> Result<usize, CacheError>;

    async fn stats(&self) -> Result<CacheStats, CacheError>;
}
