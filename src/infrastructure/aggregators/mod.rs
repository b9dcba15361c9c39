// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 通用职位聚合源
//!
//! 专用策略失败或无结果时的兜底来源，返回未经匹配过滤的职位

pub mod remoteok;
pub mod remotive;

use std::sync::Arc;

use crate::config::settings::{AggregatorSettings, ScraperSettings};
use crate::domain::scraping::JobAggregator;
use crate::engines::http_engine::{HttpEngine, HttpEngineConfig};

pub use remoteok::RemoteOkAggregator;
pub use remotive::RemotiveAggregator;

/// 按配置构建所有聚合源
pub fn default_aggregators(
    aggregators: &AggregatorSettings,
    scraper: &ScraperSettings,
) -> Vec<Arc<dyn JobAggregator>> {
    let http = HttpEngine::new(HttpEngineConfig::from(scraper));
    vec![
        Arc::new(RemotiveAggregator::new(http.clone(), &aggregators.remotive_url)),
        Arc::new(RemoteOkAggregator::new(http, &aggregators.remoteok_url)),
    ]
}
