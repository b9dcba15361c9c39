// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anyhow::{bail, Context};
use jobhound::config::settings::Settings;
use jobhound::domain::catalog::SourceCatalog;
use jobhound::domain::models::SearchRequest;
use jobhound::domain::services::{
    CompanyOrchestrator, JobMatcher, JobSearchService, OrchestratorConfig,
};
use jobhound::infrastructure::aggregators::default_aggregators;
use jobhound::infrastructure::cache::build_cache;
use jobhound::infrastructure::repositories::JsonLinesJobStore;
use jobhound::infrastructure::strategies::default_registry;
use jobhound::utils::telemetry;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

const USAGE: &str = "usage: jobhound <search <request.json> | stats | clear | sweep>";

/// 按配置组装搜索服务
fn build_service(settings: &Settings) -> anyhow::Result<JobSearchService> {
    let mut catalog = SourceCatalog::builtin();
    if let Some(path) = &settings.catalog.extra_file {
        catalog = catalog
            .with_yaml_file(path)
            .with_context(|| format!("loading catalog extras from {}", path.display()))?;
    }
    info!("Catalog loaded with {} employers", catalog.len());

    let matcher = Arc::new(JobMatcher::new(settings.matching.word_overlap_threshold));
    let registry = default_registry(&settings.scraper, matcher.clone());
    let aggregators = default_aggregators(&settings.aggregators, &settings.scraper);
    let cache = build_cache(&settings.cache);

    let orchestrator =
        CompanyOrchestrator::new(Arc::new(catalog), registry, aggregators.clone(), matcher)
            .with_cache(cache.clone())
            .with_config(OrchestratorConfig::from_settings(
                &settings.search,
                &settings.scraper,
            ));

    let mut service =
        JobSearchService::new(orchestrator, cache, aggregators, settings.search.clone());
    if let Some(path) = &settings.storage.jobs_file {
        service = service.with_store(Arc::new(JsonLinesJobStore::new(path.clone())));
    }
    Ok(service)
}

/// 读取并校验搜索请求
fn read_request(path: &str) -> anyhow::Result<SearchRequest> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading request file {}", path))?;
    let request: SearchRequest =
        serde_json::from_str(&content).context("request is not a valid SearchRequest")?;
    request.validate()?;
    Ok(request)
}

/// 主函数
///
/// 命令行入口：执行一次搜索或缓存维护，结果以 JSON 输出到 stdout
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::new().context("loading configuration")?;
    telemetry::init_telemetry(settings.logging.json);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let service = build_service(&settings)?;

    match args.first().map(String::as_str) {
        Some("search") => {
            let Some(path) = args.get(1) else {
                bail!(USAGE);
            };
            let request = read_request(path)?;
            let jobs = service.search(&request).await?;
            service.flush().await;
            println!("{}", serde_json::to_string_pretty(&jobs)?);
        }
        Some("stats") => {
            let stats = service.cache_stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Some("clear") => {
            let removed = service.clear_cache().await?;
            println!("{}", serde_json::json!({ "removed": removed }));
        }
        Some("sweep") => {
            let removed = service.sweep_cache().await?;
            println!("{}", serde_json::json!({ "removed": removed }));
        }
        _ => bail!(USAGE),
    }

    Ok(())
}
