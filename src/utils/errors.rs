// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

/// 仓库层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("存储错误: {0}")]
    StorageError(String),

    #[error("序列化错误: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO错误: {0}")]
    IoError(#[from] std::io::Error),
}

/// 搜索编排错误类型
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("无效请求: {0}")]
    InvalidRequest(String),

    #[error("所有来源均失败 ({0} 个)")]
    AllSourcesFailed(usize),

    #[error("缓存错误: {0}")]
    CacheError(String),
}
