// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::config::settings::SearchSettings;
use crate::domain::models::{CacheFingerprint, JobRecord, SearchRequest};
use crate::domain::repositories::{CacheStats, JobCache, JobIndex, JobStore};
use crate::domain::scraping::JobAggregator;
use crate::domain::services::company_orchestrator::{fetch_aggregators, CompanyOrchestrator};
use crate::utils::errors::SearchError;

/// 职位搜索服务
///
/// 顶层门面：缓存 -> 雇主编排 -> 出错时的一次降级兜底。
/// 持久化与向量索引在后台进行，失败只记录日志；
/// 进程退出前调用 `flush` 等待后台写入完成。
pub struct JobSearchService {
    orchestrator: CompanyOrchestrator,
    cache: Arc<dyn JobCache>,
    aggregators: Vec<Arc<dyn JobAggregator>>,
    store: Option<Arc<dyn JobStore>>,
    index: Option<Arc<dyn JobIndex>>,
    settings: SearchSettings,
    background: Mutex<JoinSet<()>>,
}

impl JobSearchService {
    pub fn new(
        orchestrator: CompanyOrchestrator,
        cache: Arc<dyn JobCache>,
        aggregators: Vec<Arc<dyn JobAggregator>>,
        settings: SearchSettings,
    ) -> Self {
        Self {
            orchestrator,
            cache,
            aggregators,
            store: None,
            index: None,
            settings,
            background: Mutex::new(JoinSet::new()),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn JobStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_index(mut self, index: Arc<dyn JobIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// 搜索职位
    ///
    /// 指定了雇主时等同于 `search_by_companies`；
    /// 否则使用精选默认雇主集合。
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<JobRecord>, SearchError> {
        if request.is_company_scoped() {
            return self.search_by_companies(request, &request.companies).await;
        }

        let keys = self
            .orchestrator
            .catalog()
            .curated_defaults(&self.settings.default_companies);
        let fingerprint = CacheFingerprint::new(request, &[]);
        self.execute(request, &keys, fingerprint).await
    }

    /// 按雇主搜索，超出上限的雇主键被忽略
    pub async fn search_by_companies(
        &self,
        request: &SearchRequest,
        companies: &[String],
    ) -> Result<Vec<JobRecord>, SearchError> {
        let keys = SearchRequest::normalize_companies(companies, self.settings.max_companies);
        let scoped = request.clone().with_companies(keys.clone());
        let fingerprint = CacheFingerprint::new(&scoped, &keys);
        self.execute(&scoped, &keys, fingerprint).await
    }

    async fn execute(
        &self,
        request: &SearchRequest,
        keys: &[String],
        fingerprint: CacheFingerprint,
    ) -> Result<Vec<JobRecord>, SearchError> {
        request
            .validate()
            .map_err(|e| SearchError::InvalidRequest(e.to_string()))?;

        let start = Instant::now();
        match self.cache.get(&fingerprint).await {
            Ok(Some(mut jobs)) => {
                info!("Search cache hit ({} jobs)", jobs.len());
                jobs.truncate(request.max_results);
                return Ok(jobs);
            }
            Ok(None) => {}
            Err(e) => warn!("Search cache read failed: {}", e),
        }

        let mut jobs = match self.orchestrator.orchestrate(keys, request).await {
            Ok(outcome) => {
                if outcome.is_cacheable() {
                    if let Err(e) = self.cache.put(&fingerprint, &outcome.jobs).await {
                        warn!("Search cache write failed: {}", e);
                    }
                } else if outcome.degraded > 0 {
                    debug!(
                        "Skipping search cache, {} employers served related postings",
                        outcome.degraded
                    );
                }
                outcome.jobs
            }
            Err(e) => {
                warn!("Orchestration failed, using degraded fallback: {}", e);
                self.degraded_fallback(request).await
            }
        };

        jobs.truncate(request.max_results);
        info!(
            "Search for {:?} returned {} jobs in {:?}",
            request.titles,
            jobs.len(),
            start.elapsed()
        );

        self.persist(&jobs, request).await;
        Ok(jobs)
    }

    /// 直接查询聚合源并按匹配引擎过滤
    async fn degraded_fallback(&self, request: &SearchRequest) -> Vec<JobRecord> {
        if self.aggregators.is_empty() {
            warn!("No aggregators configured, nothing to fall back to");
            return Vec::new();
        }
        let pool = fetch_aggregators(&self.aggregators, request).await;
        self.orchestrator.matcher().filter(pool, request)
    }

    /// 后台持久化与索引
    async fn persist(&self, jobs: &[JobRecord], request: &SearchRequest) {
        if jobs.is_empty() || (self.store.is_none() && self.index.is_none()) {
            return;
        }

        let mut background = self.background.lock().await;
        // reap tasks that already finished
        while background.try_join_next().is_some() {}

        if let Some(store) = self.store.clone() {
            let jobs = jobs.to_vec();
            let request = request.clone();
            background.spawn(async move {
                if let Err(e) = store.store(&jobs, &request).await {
                    warn!("Failed to store {} jobs: {}", jobs.len(), e);
                }
            });
        }

        if let Some(index) = self.index.clone() {
            let jobs = jobs.to_vec();
            background.spawn(async move {
                if let Err(e) = index.index(&jobs).await {
                    warn!("Failed to index {} jobs: {}", jobs.len(), e);
                }
            });
        }
    }

    /// 等待所有后台持久化与索引任务完成
    ///
    /// 任务失败只记录日志。
    pub async fn flush(&self) {
        let mut pending = std::mem::take(&mut *self.background.lock().await);
        while let Some(result) = pending.join_next().await {
            if let Err(e) = result {
                warn!("Background persistence task did not complete: {}", e);
            }
        }
    }

    pub async fn cache_stats(&self) -> Result<CacheStats, SearchError> {
        self.cache
            .stats()
            .await
            .map_err(|e| SearchError::CacheError(e.to_string()))
    }

    /// 清空缓存，返回删除的条目数
    pub async fn clear_cache(&self) -> Result<usize, SearchError> {
        self.cache
            .clear()
            .await
            .map_err(|e| SearchError::CacheError(e.to_string()))
    }

    /// 清理过期缓存，返回删除的条目数
    pub async fn sweep_cache(&self) -> Result<usize, SearchError> {
        self.cache
            .sweep()
            .await
            .map_err(|e| SearchError::CacheError(e.to_string()))
    }
}
