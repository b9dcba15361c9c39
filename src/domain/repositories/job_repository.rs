// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;

use crate::domain::models::{JobRecord, SearchRequest};
use crate::utils::errors::RepositoryError;

/// 职位持久化协作方
///
/// 调用方以“发出即忘”的方式使用：失败只记录日志，不影响搜索结果
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn store(&self, jobs: &[JobRecord], request: &SearchRequest)
        -> Result<(), RepositoryError>;
}

/// 向量索引协作方，失败策略同 `JobStore`
#[async_trait]
pub trait JobIndex: Send + Sync {
    async fn index(&self, jobs: &[JobRecord]) -> Result<(), RepositoryError>;
}
