// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use super::extract::{finalize, PostingDraft, RecordContext};
use super::HttpContext;
use crate::domain::catalog::StrategyKind;
use crate::domain::models::{JobRecord, SearchRequest};
use crate::domain::scraping::{ExtractionStrategy, ScrapeError};
use crate::domain::services::job_matcher::REMOTE_MARKERS;
use crate::utils::url_utils::{host_matches, origin_of};

const RESULT_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    jobs: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct AmazonJob {
    title: String,
    company_name: Option<String>,
    normalized_location: Option<String>,
    location: Option<String>,
    job_path: Option<String>,
    posted_date: Option<String>,
    description_short: Option<String>,
    job_schedule_type: Option<String>,
}

impl AmazonJob {
    fn into_draft(self) -> PostingDraft {
        PostingDraft {
            title: self.title,
            url: self.job_path,
            company: self.company_name,
            location: self.normalized_location.or(self.location),
            description: self.description_short,
            posted_date: self.posted_date,
            employment_type: self.job_schedule_type,
            ..Default::default()
        }
    }
}

/// Amazon Jobs 搜索接口
///
/// 页面本身由前端渲染，但站点提供同源的 `search.json`
pub struct AmazonJobsStrategy {
    ctx: HttpContext,
    api_base: Option<String>,
}

impl AmazonJobsStrategy {
    pub fn new(ctx: HttpContext) -> Self {
        Self { ctx, api_base: None }
    }

    /// 覆盖接口地址，默认与职位页同源
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into().trim_end_matches('/').to_string());
        self
    }

    fn search_url(&self, page_url: &str, request: &SearchRequest) -> Option<String> {
        let base = match &self.api_base {
            Some(base) => base.clone(),
            None => origin_of(page_url)?,
        };
        let location = request
            .locations
            .iter()
            .map(|l| l.trim())
            .find(|l| {
                let lower = l.to_lowercase();
                !l.is_empty() && lower != "any" && !REMOTE_MARKERS.iter().any(|m| lower.contains(m))
            })
            .unwrap_or("");
        Some(format!(
            "{}/en/search.json?base_query={}&loc_query={}&result_limit={}&offset=0&sort=recent",
            base,
            urlencoding::encode(request.primary_title()),
            urlencoding::encode(location),
            RESULT_LIMIT
        ))
    }
}

#[async_trait]
impl ExtractionStrategy for AmazonJobsStrategy {
    fn name(&self) -> &'static str {
        "amazon_jobs"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::AmazonJobs
    }

    fn can_handle(&self, url: &str) -> bool {
        host_matches(url, "amazon.jobs")
    }

    async fn scrape(&self, url: &str, request: &SearchRequest) -> Result<Vec<JobRecord>, ScrapeError> {
        let api_url = self
            .search_url(url, request)
            .ok_or_else(|| ScrapeError::UnsupportedUrl {
                strategy: self.name(),
                url: url.to_string(),
            })?;
        let response: SearchResponse = self.ctx.http.get_json(&api_url).await?;

        let drafts: Vec<PostingDraft> = response
            .jobs
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<AmazonJob>(value) {
                Ok(job) => Some(job.into_draft()),
                Err(e) => {
                    debug!("Skipping malformed Amazon posting: {}", e);
                    None
                }
            })
            .collect();

        let ctx = RecordContext {
            company: "Amazon",
            source: self.name(),
            page_url: url,
            min_title_len: self.ctx.min_title_len,
        };
        let jobs = finalize(drafts, &ctx, &self.ctx.matcher, request);
        info!("Amazon Jobs: {} matching postings", jobs.len());
        Ok(jobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::job_matcher::JobMatcher;
    use crate::engines::http_engine::HttpEngine;
    use std::sync::Arc;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn strategy(base: &str) -> AmazonJobsStrategy {
        AmazonJobsStrategy::new(HttpContext::new(
            HttpEngine::default(),
            Arc::new(JobMatcher::default()),
        ))
        .with_api_base(base)
    }

    #[test]
    fn test_search_url_skips_remote_location() {
        let s = AmazonJobsStrategy::new(HttpContext::new(
            HttpEngine::default(),
            Arc::new(JobMatcher::default()),
        ));
        let request = SearchRequest::new(
            vec!["SDET".into()],
            vec!["Remote".into(), "Seattle, WA".into()],
        );
        let url = s
            .search_url("https://www.amazon.jobs/en/search", &request)
            .unwrap();
        assert!(url.starts_with("https://www.amazon.jobs/en/search.json?base_query=SDET"));
        assert!(url.contains("loc_query=Seattle%2C%20WA"));
    }

    #[tokio::test]
    async fn test_scrape_resolves_job_paths() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "hits": 1,
            "jobs": [{
                "title": "Software Development Engineer in Test",
                "company_name": "Amazon Web Services, Inc.",
                "location": "US, WA, Seattle",
                "normalized_location": "Seattle, Washington, USA",
                "job_path": "/en/jobs/2612345/software-development-engineer-in-test",
                "posted_date": "March 4, 2024",
                "description_short": "Build test frameworks.",
                "job_schedule_type": "full-time"
            }]
        });
        Mock::given(method("GET"))
            .and(path("/en/search.json"))
            .and(query_param("base_query", "SDET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let request = SearchRequest::new(vec!["SDET".into()], vec!["Seattle".into()]);
        let jobs = strategy(&server.uri())
            .scrape("https://www.amazon.jobs/en/search", &request)
            .await
            .unwrap();

        assert_eq!(jobs.len(), 1);
        assert_eq!(
            jobs[0].url(),
            "https://www.amazon.jobs/en/jobs/2612345/software-development-engineer-in-test"
        );
        assert_eq!(jobs[0].posted_date(), Some("March 4, 2024"));
        assert_eq!(jobs[0].employment_type(), Some("Full-time"));
        assert_eq!(jobs[0].company(), "Amazon Web Services, Inc.");
    }
}
