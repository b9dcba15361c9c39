// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 抽取策略实现
//!
//! HTTP 家族：Greenhouse、Lever、Ashby、SmartRecruiters、Amazon Jobs、通用 HTML 列表；
//! 浏览器家族：Workday、通用招聘页。

pub mod amazon;
pub mod ashby;
pub mod browser_careers;
pub mod extract;
pub mod greenhouse;
pub mod html_listing;
pub mod lever;
pub mod smartrecruiters;
pub mod workday;

use std::sync::Arc;

use crate::config::settings::ScraperSettings;
use crate::domain::scraping::ExtractionStrategy;
use crate::domain::services::job_matcher::JobMatcher;
use crate::engines::browser_engine::{BrowserEngine, BrowserEngineConfig};
use crate::engines::http_engine::{HttpEngine, HttpEngineConfig};
use crate::engines::registry::ScraperRegistry;

pub use amazon::AmazonJobsStrategy;
pub use ashby::AshbyStrategy;
pub use browser_careers::BrowserCareersStrategy;
pub use greenhouse::GreenhouseStrategy;
pub use html_listing::HtmlListingStrategy;
pub use lever::LeverStrategy;
pub use smartrecruiters::SmartRecruitersStrategy;
pub use workday::WorkdayStrategy;

/// HTTP 策略共享的依赖
#[derive(Clone)]
pub struct HttpContext {
    pub http: HttpEngine,
    pub matcher: Arc<JobMatcher>,
    pub min_title_len: usize,
}

impl HttpContext {
    pub fn new(http: HttpEngine, matcher: Arc<JobMatcher>) -> Self {
        Self {
            http,
            matcher,
            min_title_len: extract::DEFAULT_MIN_TITLE_LEN,
        }
    }

    pub fn with_min_title_len(mut self, min_title_len: usize) -> Self {
        self.min_title_len = min_title_len;
        self
    }
}

/// 浏览器策略共享的依赖
#[derive(Clone)]
pub struct BrowserContext {
    pub browser: BrowserEngine,
    pub matcher: Arc<JobMatcher>,
    pub min_title_len: usize,
}

/// 按默认顺序构建完整的策略注册表
pub fn default_registry(settings: &ScraperSettings, matcher: Arc<JobMatcher>) -> ScraperRegistry {
    let http = HttpContext::new(HttpEngine::new(HttpEngineConfig::from(settings)), matcher.clone())
        .with_min_title_len(settings.min_title_len);
    let browser = BrowserContext {
        browser: BrowserEngine::new(BrowserEngineConfig::from(settings)),
        matcher,
        min_title_len: settings.min_title_len,
    };

    let strategies: Vec<Arc<dyn ExtractionStrategy>> = vec![
        Arc::new(GreenhouseStrategy::new(http.clone())),
        Arc::new(LeverStrategy::new(http.clone())),
        Arc::new(AshbyStrategy::new(http.clone())),
        Arc::new(SmartRecruitersStrategy::new(http.clone())),
        Arc::new(AmazonJobsStrategy::new(http.clone())),
        Arc::new(HtmlListingStrategy::new(http)),
        Arc::new(WorkdayStrategy::new(browser.clone())),
        Arc::new(BrowserCareersStrategy::new(browser)),
    ];
    ScraperRegistry::new(strategies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::Settings;
    use crate::domain::catalog::{SourceCatalog, StrategyFamily};

    #[test]
    fn test_default_registry_order() {
        let settings = Settings::default_settings().unwrap();
        let registry = default_registry(&settings.scraper, Arc::new(JobMatcher::default()));
        let names: Vec<_> = registry.strategies().iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec![
                "greenhouse",
                "lever",
                "ashby",
                "smartrecruiters",
                "amazon_jobs",
                "html_listing",
                "workday",
                "browser_careers"
            ]
        );
    }

    #[test]
    fn test_every_catalog_entry_gets_its_own_kind() {
        let settings = Settings::default_settings().unwrap();
        let registry = default_registry(&settings.scraper, Arc::new(JobMatcher::default()));
        for entry in SourceCatalog::builtin().entries() {
            let strategy = registry.select_for(entry).unwrap();
            assert_eq!(strategy.kind(), entry.kind, "entry {}", entry.key);
        }
    }

    #[test]
    fn test_client_rendered_pages_route_to_browser() {
        let settings = Settings::default_settings().unwrap();
        let registry = default_registry(&settings.scraper, Arc::new(JobMatcher::default()));
        let strategy = registry
            .select("https://nvidia.wd5.myworkdayjobs.com/NVIDIAExternalCareerSite")
            .unwrap();
        assert_eq!(strategy.family(), StrategyFamily::Browser);
        assert_eq!(
            registry.select("https://basecamp.com/jobs").unwrap().name(),
            "html_listing"
        );
    }
}
