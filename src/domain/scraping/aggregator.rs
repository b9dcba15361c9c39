// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;

use crate::domain::models::{JobRecord, SearchRequest};
use crate::domain::scraping::strategy::ScrapeError;

/// 通用多雇主聚合源，仅用于降级
#[async_trait]
pub trait JobAggregator: Send + Sync {
    /// 聚合源标识，对应 `SearchRequest::boards`
    fn name(&self) -> &'static str;

    /// 按请求的主标题拉取职位（未经匹配过滤）
    async fn fetch(&self, request: &SearchRequest) -> Result<Vec<JobRecord>, ScrapeError>;
}
