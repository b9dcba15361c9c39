// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::catalog::{StrategyFamily, StrategyKind};
use crate::domain::models::{JobRecord, SearchRequest};

/// 单个来源的抓取错误
#[derive(Debug, Error, Clone)]
pub enum ScrapeError {
    #[error("Engine error: {0}")]
    Engine(String),
    #[error("Timeout")]
    Timeout,
    #[error("{strategy} cannot handle {url}")]
    UnsupportedUrl { strategy: &'static str, url: String },
    #[error("Page structure changed: {0}")]
    Structure(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

/// 抽取策略
///
/// 每个实现负责一类来源：识别自己能处理的 URL，抓取并把职位标准化为
/// `JobRecord`。返回的职位已经过匹配引擎过滤。
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    /// 策略名称，同时作为 `JobRecord::source`
    fn name(&self) -> &'static str;

    fn kind(&self) -> StrategyKind;

    fn family(&self) -> StrategyFamily {
        self.kind().family()
    }

    fn can_handle(&self, url: &str) -> bool;

    async fn scrape(&self, url: &str, request: &SearchRequest)
        -> Result<Vec<JobRecord>, ScrapeError>;
}
