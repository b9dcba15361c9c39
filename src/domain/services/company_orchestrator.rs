// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use strsim::jaro_winkler;
use tracing::{debug, info, warn};

use crate::config::settings::{ScraperSettings, SearchSettings};
use crate::domain::catalog::SourceCatalog;
use crate::domain::models::{CacheFingerprint, JobRecord, SearchRequest};
use crate::domain::repositories::JobCache;
use crate::domain::scraping::{JobAggregator, ScrapeError};
use crate::domain::services::job_matcher::JobMatcher;
use crate::engines::registry::ScraperRegistry;
use crate::utils::errors::SearchError;

/// 雇主名称相似度阈值（Jaro-Winkler）
pub const NAME_SIMILARITY_THRESHOLD: f64 = 0.92;

/// 比较雇主名称时忽略的公司后缀
const COMPANY_SUFFIXES: &[&str] = &[
    "inc", "llc", "ltd", "limited", "corp", "corporation", "co", "company", "gmbh", "plc", "sa",
    "ag", "bv", "the",
];

/// 编排器配置
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// 每个雇主最多保留的职位数
    pub per_employer_limit: usize,
    /// 相邻两次网络抓取之间的礼貌间隔
    pub courtesy_delay: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            per_employer_limit: 15,
            courtesy_delay: Duration::from_millis(1500),
        }
    }
}

impl OrchestratorConfig {
    pub fn from_settings(search: &SearchSettings, scraper: &ScraperSettings) -> Self {
        Self {
            per_employer_limit: search.per_employer_limit.max(1),
            courtesy_delay: Duration::from_millis(scraper.courtesy_delay_ms),
        }
    }
}

/// 规范化雇主名称：小写、去标点、去掉公司后缀
pub fn normalize_employer(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty() && !COMPANY_SUFFIXES.contains(w))
        .collect::<Vec<_>>()
        .join(" ")
}

/// 职位的雇主是否属于给定名称变体之一
pub fn is_attributed_to(job: &JobRecord, variants: &[String]) -> bool {
    let company = normalize_employer(job.company());
    if company.is_empty() {
        return false;
    }
    variants.iter().any(|variant| {
        let variant = normalize_employer(variant);
        !variant.is_empty()
            && (company == variant || jaro_winkler(&company, &variant) >= NAME_SIMILARITY_THRESHOLD)
    })
}

/// 单个雇主的抓取结果
enum EmployerOutcome {
    /// 来自缓存，无网络请求
    Cached(Vec<JobRecord>),
    Scraped(Vec<JobRecord>),
    /// 聚合源中与该雇主无关的相关职位，不写入缓存
    Degraded(Vec<JobRecord>),
    Failed(ScrapeError),
}

/// 聚合源兜底结果
enum FallbackJobs {
    /// 归属于该雇主的职位
    Attributed(Vec<JobRecord>),
    /// 仅满足匹配条件的其他雇主职位
    Related(Vec<JobRecord>),
}

/// 一次编排的结果
#[derive(Debug, Default)]
pub struct Orchestration {
    pub jobs: Vec<JobRecord>,
    /// 只拿到相关职位（非该雇主本身）的雇主数
    pub degraded: usize,
}

impl Orchestration {
    /// 结果中没有降级内容，可以整体缓存
    pub fn is_cacheable(&self) -> bool {
        self.degraded == 0 && !self.jobs.is_empty()
    }
}

/// 雇主编排器
///
/// 按雇主逐个抓取（串行，带礼貌间隔），单个雇主失败不影响其他雇主。
/// 累计结果达到 `max_results` 后不再发起新的抓取。
/// 没有专用策略或专用策略无结果时，退回通用聚合源。
pub struct CompanyOrchestrator {
    catalog: Arc<SourceCatalog>,
    registry: ScraperRegistry,
    aggregators: Vec<Arc<dyn JobAggregator>>,
    matcher: Arc<JobMatcher>,
    cache: Option<Arc<dyn JobCache>>,
    config: OrchestratorConfig,
}

/// 一次编排中共享的聚合源结果，只拉取一次
#[derive(Default)]
struct AggregatorPool {
    jobs: Option<Vec<JobRecord>>,
}

impl CompanyOrchestrator {
    pub fn new(
        catalog: Arc<SourceCatalog>,
        registry: ScraperRegistry,
        aggregators: Vec<Arc<dyn JobAggregator>>,
        matcher: Arc<JobMatcher>,
    ) -> Self {
        Self {
            catalog,
            registry,
            aggregators,
            matcher,
            cache: None,
            config: OrchestratorConfig::default(),
        }
    }

    /// 启用按雇主缓存
    pub fn with_cache(mut self, cache: Arc<dyn JobCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn catalog(&self) -> &SourceCatalog {
        &self.catalog
    }

    pub fn matcher(&self) -> &JobMatcher {
        &self.matcher
    }

    /// 对给定雇主键依次抓取，只返回职位列表
    pub async fn run(
        &self,
        keys: &[String],
        request: &SearchRequest,
    ) -> Result<Vec<JobRecord>, SearchError> {
        self.orchestrate(keys, request).await.map(|o| o.jobs)
    }

    /// 对给定雇主键依次抓取
    ///
    /// # 参数
    ///
    /// * `keys` - 规范化后的雇主键（按目录顺序追加结果）
    /// * `request` - 搜索请求
    ///
    /// # 返回值
    ///
    /// 去重后的职位列表，最多 `max_results` 条。
    /// 只有当每个尝试过的雇主都失败且没有任何结果时才返回
    /// `SearchError::AllSourcesFailed`。
    pub async fn orchestrate(
        &self,
        keys: &[String],
        request: &SearchRequest,
    ) -> Result<Orchestration, SearchError> {
        let start = Instant::now();
        let mut results: Vec<JobRecord> = Vec::new();
        let mut seen = HashSet::new();
        let mut pool = AggregatorPool::default();
        let mut attempted = 0;
        let mut failed = 0;
        let mut degraded = 0;
        let mut scraped_before = false;

        for (i, key) in keys.iter().enumerate() {
            if results.len() >= request.max_results {
                info!(
                    "Reached {} results, skipping remaining {} employers",
                    request.max_results,
                    keys.len() - i
                );
                break;
            }
            attempted += 1;

            let outcome = self
                .employer_jobs(key, request, &mut pool, &mut scraped_before)
                .await;
            let jobs = match outcome {
                EmployerOutcome::Cached(jobs) => jobs,
                EmployerOutcome::Scraped(mut jobs) => {
                    jobs.truncate(self.config.per_employer_limit);
                    self.cache_employer(key, request, &jobs).await;
                    jobs
                }
                EmployerOutcome::Degraded(mut jobs) => {
                    jobs.truncate(self.config.per_employer_limit);
                    degraded += 1;
                    jobs
                }
                EmployerOutcome::Failed(e) => {
                    warn!("Employer {} failed: {}", key, e);
                    failed += 1;
                    continue;
                }
            };

            let before = results.len();
            for job in jobs {
                if seen.insert(job.url().to_string()) {
                    results.push(job);
                }
            }
            debug!("Employer {} contributed {} postings", key, results.len() - before);
        }

        if results.is_empty() && attempted > 0 && failed == attempted {
            return Err(SearchError::AllSourcesFailed(failed));
        }

        results.truncate(request.max_results);
        info!(
            "Orchestrated {} employers ({} failed, {} degraded), {} postings in {:?}",
            attempted,
            failed,
            degraded,
            results.len(),
            start.elapsed()
        );
        Ok(Orchestration {
            jobs: results,
            degraded,
        })
    }

    async fn employer_jobs(
        &self,
        key: &str,
        request: &SearchRequest,
        pool: &mut AggregatorPool,
        scraped_before: &mut bool,
    ) -> EmployerOutcome {
        if let Some(jobs) = self.cached_employer(key, request).await {
            return EmployerOutcome::Cached(jobs);
        }

        if *scraped_before {
            self.courtesy_pause().await;
        }
        *scraped_before = true;

        self.scrape_employer(key, request, pool).await
    }

    /// 先用专用策略（逐级升级候选策略），失败或无结果时退回通用聚合源
    async fn scrape_employer(
        &self,
        key: &str,
        request: &SearchRequest,
        pool: &mut AggregatorPool,
    ) -> EmployerOutcome {
        let mut dedicated_error = None;
        let variants = match self.catalog.get(key) {
            Some(entry) => {
                debug!("Scraping {} from {}", entry.key, entry.url);
                match self.registry.scrape_entry(entry, request).await {
                    Ok(jobs) if !jobs.is_empty() => {
                        return EmployerOutcome::Scraped(
                            jobs.into_iter()
                                .map(|job| job.with_company(entry.name.clone()))
                                .collect(),
                        );
                    }
                    Ok(_) => info!("No strategy found matching postings for {}", key),
                    Err(e @ ScrapeError::UnsupportedUrl { .. }) => {
                        warn!("No strategy can handle {} ({}): {}", key, entry.url, e)
                    }
                    Err(e) => {
                        warn!("Dedicated scrape failed for {}: {}", key, e);
                        dedicated_error = Some(e);
                    }
                }
                entry.name_variants()
            }
            None => {
                info!("Employer {} is not in the catalog, using aggregators", key);
                vec![key.to_string()]
            }
        };

        match self.generic_fallback(&variants, request, pool).await {
            FallbackJobs::Attributed(jobs) => EmployerOutcome::Scraped(jobs),
            FallbackJobs::Related(jobs) if jobs.is_empty() => match dedicated_error {
                Some(e) => EmployerOutcome::Failed(e),
                None => EmployerOutcome::Scraped(jobs),
            },
            FallbackJobs::Related(jobs) => EmployerOutcome::Degraded(jobs),
        }
    }

    /// 通用聚合源兜底
    ///
    /// 先取归属于该雇主（名称变体）的匹配职位；没有时退化为一般匹配职位
    async fn generic_fallback(
        &self,
        variants: &[String],
        request: &SearchRequest,
        pool: &mut AggregatorPool,
    ) -> FallbackJobs {
        let jobs = self.pool_jobs(request, pool).await;
        if jobs.is_empty() {
            return FallbackJobs::Related(Vec::new());
        }

        let attributed: Vec<JobRecord> = jobs
            .iter()
            .filter(|job| is_attributed_to(job, variants))
            .filter(|job| self.matcher.matches(job, request))
            .cloned()
            .collect();
        if !attributed.is_empty() {
            info!(
                "Aggregators provided {} postings attributed to {}",
                attributed.len(),
                variants.first().map(String::as_str).unwrap_or("")
            );
            return FallbackJobs::Attributed(attributed);
        }

        let related = self.matcher.filter(jobs.to_vec(), request);
        debug!("Falling back to {} related postings", related.len());
        FallbackJobs::Related(related)
    }

    async fn pool_jobs<'p>(
        &self,
        request: &SearchRequest,
        pool: &'p mut AggregatorPool,
    ) -> &'p [JobRecord] {
        if pool.jobs.is_none() {
            pool.jobs = Some(fetch_aggregators(&self.aggregators, request).await);
        }
        pool.jobs.as_deref().unwrap_or_default()
    }

    async fn cached_employer(&self, key: &str, request: &SearchRequest) -> Option<Vec<JobRecord>> {
        let cache = self.cache.as_ref()?;
        let fingerprint = CacheFingerprint::new(request, &[key.to_string()]);
        match cache.get(&fingerprint).await {
            Ok(Some(jobs)) => {
                debug!("Employer cache hit for {} ({} jobs)", key, jobs.len());
                Some(jobs)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Employer cache read failed for {}: {}", key, e);
                None
            }
        }
    }

    async fn cache_employer(&self, key: &str, request: &SearchRequest, jobs: &[JobRecord]) {
        let Some(cache) = self.cache.as_ref() else {
            return;
        };
        if jobs.is_empty() {
            return;
        }
        let fingerprint = CacheFingerprint::new(request, &[key.to_string()]);
        if let Err(e) = cache.put(&fingerprint, jobs).await {
            warn!("Employer cache write failed for {}: {}", key, e);
        }
    }

    async fn courtesy_pause(&self) {
        let base = self.config.courtesy_delay.as_millis() as u64;
        if base == 0 {
            return;
        }
        let jitter = rand::random_range(0..=base / 2);
        tokio::time::sleep(Duration::from_millis(base + jitter)).await;
    }
}

/// 从选定的聚合源拉取职位
///
/// `request.boards` 为空或不匹配任何聚合源时使用全部聚合源。
/// 单个聚合源失败只记录日志。
pub async fn fetch_aggregators(
    aggregators: &[Arc<dyn JobAggregator>],
    request: &SearchRequest,
) -> Vec<JobRecord> {
    let selected: Vec<&Arc<dyn JobAggregator>> = {
        let wanted: Vec<&Arc<dyn JobAggregator>> = aggregators
            .iter()
            .filter(|a| request.boards.iter().any(|b| b.eq_ignore_ascii_case(a.name())))
            .collect();
        if wanted.is_empty() {
            aggregators.iter().collect()
        } else {
            wanted
        }
    };

    let futures = selected.into_iter().map(|aggregator| async move {
        match aggregator.fetch(request).await {
            Ok(jobs) => {
                info!("Aggregator {} returned {} postings", aggregator.name(), jobs.len());
                jobs
            }
            Err(e) => {
                warn!("Aggregator {} failed: {}", aggregator.name(), e);
                Vec::new()
            }
        }
    });

    let mut seen = HashSet::new();
    join_all(futures)
        .await
        .into_iter()
        .flatten()
        .filter(|job| seen.insert(job.url().to_string()))
        .collect()
}
