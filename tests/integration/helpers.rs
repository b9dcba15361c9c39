// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use jobhound::config::settings::SearchSettings;
use jobhound::domain::catalog::{CatalogEntry, SourceCatalog, StrategyKind};
use jobhound::domain::repositories::JobCache;
use jobhound::domain::scraping::{ExtractionStrategy, JobAggregator};
use jobhound::domain::services::{
    CompanyOrchestrator, JobMatcher, JobSearchService, OrchestratorConfig,
};
use jobhound::engines::http_engine::HttpEngine;
use jobhound::engines::registry::ScraperRegistry;
use jobhound::infrastructure::aggregators::RemotiveAggregator;
use jobhound::infrastructure::cache::FileJobCache;
use jobhound::infrastructure::strategies::{GreenhouseStrategy, HttpContext, LeverStrategy};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// 指向 mock 服务器的完整搜索栈
pub struct TestStack {
    pub service: JobSearchService,
    pub cache: Arc<FileJobCache>,
    // 保持临时目录存活
    _cache_dir: TempDir,
}

pub fn catalog() -> SourceCatalog {
    SourceCatalog::new(vec![
        CatalogEntry::new(
            "acme",
            "Acme",
            "https://boards.greenhouse.io/acme",
            StrategyKind::Greenhouse,
        )
        .with_categories(&["fintech"]),
        CatalogEntry::new(
            "globex",
            "Globex",
            "https://jobs.lever.co/globex",
            StrategyKind::Lever,
        )
        .with_aliases(&["Globex Corporation"])
        .with_categories(&["enterprise"]),
    ])
}

pub fn build_stack(server_uri: &str) -> TestStack {
    let matcher = Arc::new(JobMatcher::default());
    let ctx = HttpContext::new(HttpEngine::default(), matcher.clone());
    let strategies: Vec<Arc<dyn ExtractionStrategy>> = vec![
        Arc::new(GreenhouseStrategy::new(ctx.clone()).with_api_base(server_uri)),
        Arc::new(LeverStrategy::new(ctx).with_api_base(server_uri)),
    ];
    let aggregators: Vec<Arc<dyn JobAggregator>> = vec![Arc::new(RemotiveAggregator::new(
        HttpEngine::default(),
        &format!("{}/remotive", server_uri),
    ))];

    let cache_dir = TempDir::new().expect("temp dir");
    let cache = Arc::new(FileJobCache::new(cache_dir.path(), Duration::from_secs(6 * 3600)));
    let shared: Arc<dyn JobCache> = cache.clone();

    let orchestrator = CompanyOrchestrator::new(
        Arc::new(catalog()),
        ScraperRegistry::new(strategies),
        aggregators.clone(),
        matcher,
    )
    .with_cache(shared.clone())
    .with_config(OrchestratorConfig {
        per_employer_limit: 15,
        courtesy_delay: Duration::ZERO,
    });

    let settings = SearchSettings {
        max_companies: 5,
        per_employer_limit: 15,
        default_max_results: 50,
        default_companies: vec!["acme".into(), "globex".into()],
    };

    TestStack {
        service: JobSearchService::new(orchestrator, shared, aggregators, settings),
        cache,
        _cache_dir: cache_dir,
    }
}
