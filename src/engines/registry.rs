// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::domain::catalog::{CatalogEntry, StrategyFamily, StrategyKind};
use crate::domain::models::{JobRecord, SearchRequest};
use crate::domain::scraping::{ExtractionStrategy, ScrapeError};

/// 抽取策略注册表
///
/// 按注册顺序保存策略，HTTP 家族始终排在浏览器家族之前。
/// 对给定 URL 选择第一个声明可处理的策略。
#[derive(Clone, Default)]
pub struct ScraperRegistry {
    strategies: Vec<Arc<dyn ExtractionStrategy>>,
}

fn family_rank(family: StrategyFamily) -> u8 {
    match family {
        StrategyFamily::Http => 0,
        StrategyFamily::Browser => 1,
    }
}

impl ScraperRegistry {
    /// 创建新的注册表
    ///
    /// # 参数
    ///
    /// * `strategies` - 策略列表，同一家族内保持给定顺序
    pub fn new(strategies: Vec<Arc<dyn ExtractionStrategy>>) -> Self {
        let mut registry = Self::default();
        for strategy in strategies {
            registry.register(strategy);
        }
        registry
    }

    /// 注册策略
    pub fn register(&mut self, strategy: Arc<dyn ExtractionStrategy>) {
        debug!(
            "Registering strategy {} ({:?})",
            strategy.name(),
            strategy.family()
        );
        self.strategies.push(strategy);
        // stable sort keeps registration order within a family
        self.strategies.sort_by_key(|s| family_rank(s.family()));
    }

    pub fn strategies(&self) -> &[Arc<dyn ExtractionStrategy>] {
        &self.strategies
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// 第一个能处理该 URL 的策略
    pub fn select(&self, url: &str) -> Option<Arc<dyn ExtractionStrategy>> {
        self.strategies.iter().find(|s| s.can_handle(url)).cloned()
    }

    /// 所有能处理该 URL 的策略（按优先级）
    pub fn candidates(&self, url: &str) -> Vec<Arc<dyn ExtractionStrategy>> {
        self.strategies
            .iter()
            .filter(|s| s.can_handle(url))
            .cloned()
            .collect()
    }

    pub fn by_kind(&self, kind: StrategyKind) -> Option<Arc<dyn ExtractionStrategy>> {
        self.strategies.iter().find(|s| s.kind() == kind).cloned()
    }

    /// 为目录条目选择策略
    ///
    /// 优先使用条目声明的策略类型，其不可用或不接受该 URL 时退回 `select`
    pub fn select_for(&self, entry: &CatalogEntry) -> Option<Arc<dyn ExtractionStrategy>> {
        self.by_kind(entry.kind)
            .filter(|s| s.can_handle(&entry.url))
            .or_else(|| self.select(&entry.url))
    }

    /// 抓取单个 URL
    ///
    /// 按优先级依次尝试候选策略，直到某个策略返回非空结果。
    /// 全部失败时返回最后一个错误。
    pub async fn scrape_url(
        &self,
        url: &str,
        request: &SearchRequest,
    ) -> Result<Vec<JobRecord>, ScrapeError> {
        self.escalate(url, self.candidates(url), request).await
    }

    /// 抓取目录条目
    ///
    /// 条目声明的策略排在最前，其余候选按注册表优先级依次升级
    /// （HTTP 在浏览器之前）。
    pub async fn scrape_entry(
        &self,
        entry: &CatalogEntry,
        request: &SearchRequest,
    ) -> Result<Vec<JobRecord>, ScrapeError> {
        self.escalate(&entry.url, self.candidates_for(entry), request)
            .await
    }

    /// 条目的候选策略：`select_for` 的结果在前，其余候选随后
    pub fn candidates_for(&self, entry: &CatalogEntry) -> Vec<Arc<dyn ExtractionStrategy>> {
        let mut ordered = Vec::new();
        if let Some(preferred) = self.select_for(entry) {
            ordered.push(preferred);
        }
        for strategy in self.candidates(&entry.url) {
            if !ordered.iter().any(|s| Arc::ptr_eq(s, &strategy)) {
                ordered.push(strategy);
            }
        }
        ordered
    }

    async fn escalate(
        &self,
        url: &str,
        candidates: Vec<Arc<dyn ExtractionStrategy>>,
        request: &SearchRequest,
    ) -> Result<Vec<JobRecord>, ScrapeError> {
        if candidates.is_empty() {
            warn!("No strategy can handle {}", url);
            return Err(ScrapeError::UnsupportedUrl {
                strategy: "registry",
                url: url.to_string(),
            });
        }

        let mut last_error = None;
        let mut succeeded = false;
        for strategy in candidates {
            let start = Instant::now();
            match strategy.scrape(url, request).await {
                Ok(jobs) if !jobs.is_empty() => {
                    info!(
                        "Strategy {} returned {} postings from {} in {:?}",
                        strategy.name(),
                        jobs.len(),
                        url,
                        start.elapsed()
                    );
                    return Ok(jobs);
                }
                Ok(_) => {
                    succeeded = true;
                    debug!("Strategy {} found nothing at {}, escalating", strategy.name(), url);
                }
                Err(e) => {
                    warn!("Strategy {} failed for {}: {}", strategy.name(), url, e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if !succeeded => Err(e),
            _ => Ok(Vec::new()),
        }
    }

    /// 依次抓取多个 URL，累计达到 `max_results` 后停止
    pub async fn scrape_many(&self, urls: &[String], request: &SearchRequest) -> Vec<JobRecord> {
        let mut results = Vec::new();
        let mut seen = HashSet::new();

        for (i, url) in urls.iter().enumerate() {
            if results.len() >= request.max_results {
                info!(
                    "Reached {} results, skipping remaining {} urls",
                    request.max_results,
                    urls.len() - i
                );
                break;
            }
            match self.scrape_url(url, request).await {
                Ok(jobs) => {
                    for job in jobs {
                        if seen.insert(job.url().to_string()) {
                            results.push(job);
                        }
                    }
                }
                Err(e) => warn!("Skipping {}: {}", url, e),
            }
        }

        results.truncate(request.max_results);
        results
    }
}
