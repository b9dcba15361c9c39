// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 抓取契约模块
///
/// 定义抽取策略与通用聚合源的接口
pub mod aggregator;
pub mod strategy;

pub use aggregator::JobAggregator;
pub use strategy::{ExtractionStrategy, ScrapeError};
