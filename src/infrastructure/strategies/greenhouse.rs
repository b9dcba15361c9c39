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
use crate::utils::text::{html_to_text, titleize};
use crate::utils::url_utils::{host_matches, path_segments, query_param};

pub const DEFAULT_API_BASE: &str = "https://boards-api.greenhouse.io";

#[derive(Debug, Deserialize)]
struct BoardResponse {
    #[serde(default)]
    jobs: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct Named {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GreenhouseJob {
    title: String,
    absolute_url: Option<String>,
    location: Option<Named>,
    company_name: Option<String>,
    first_published: Option<String>,
    updated_at: Option<String>,
    content: Option<String>,
}

impl GreenhouseJob {
    fn into_draft(self) -> PostingDraft {
        PostingDraft {
            title: self.title,
            url: self.absolute_url,
            company: self.company_name,
            location: self.location.and_then(|l| l.name),
            description: self.content.map(|c| html_to_text(&c)),
            posted_date: self.first_published.or(self.updated_at),
            ..Default::default()
        }
    }
}

/// Greenhouse 职位板
///
/// 通过公开的 board API 获取 JSON，无需渲染页面
pub struct GreenhouseStrategy {
    ctx: HttpContext,
    api_base: String,
}

impl GreenhouseStrategy {
    pub fn new(ctx: HttpContext) -> Self {
        Self {
            ctx,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// 从职位板地址中解析 board token
    ///
    /// 支持 `boards.greenhouse.io/{token}`、嵌入式 `?for={token}` 与 API 地址
    pub fn board_token(url: &str) -> Option<String> {
        if let Some(token) = query_param(url, "for").filter(|t| !t.is_empty()) {
            return Some(token);
        }
        path_segments(url)
            .into_iter()
            .find(|s| !matches!(s.as_str(), "v1" | "boards" | "embed" | "job_board"))
    }
}

#[async_trait]
impl ExtractionStrategy for GreenhouseStrategy {
    fn name(&self) -> &'static str {
        "greenhouse"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Greenhouse
    }

    fn can_handle(&self, url: &str) -> bool {
        host_matches(url, "greenhouse.io") && Self::board_token(url).is_some()
    }

    async fn scrape(&self, url: &str, request: &SearchRequest) -> Result<Vec<JobRecord>, ScrapeError> {
        let token = Self::board_token(url).ok_or_else(|| ScrapeError::UnsupportedUrl {
            strategy: self.name(),
            url: url.to_string(),
        })?;
        let api_url = format!("{}/v1/boards/{}/jobs?content=true", self.api_base, token);
        let board: BoardResponse = self.ctx.http.get_json(&api_url).await?;

        let drafts: Vec<PostingDraft> = board
            .jobs
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<GreenhouseJob>(value) {
                Ok(job) => Some(job.into_draft()),
                Err(e) => {
                    debug!("Skipping malformed Greenhouse posting: {}", e);
                    None
                }
            })
            .collect();

        let company = titleize(&token);
        let ctx = RecordContext {
            company: &company,
            source: self.name(),
            page_url: url,
            min_title_len: self.ctx.min_title_len,
        };
        let jobs = finalize(drafts, &ctx, &self.ctx.matcher, request);
        info!("Greenhouse board {}: {} matching postings", token, jobs.len());
        Ok(jobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::job_matcher::JobMatcher;
    use crate::engines::http_engine::HttpEngine;
    use std::sync::Arc;
    use wiremock::matchers::{method, path, query_param as wm_query};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn strategy(base: &str) -> GreenhouseStrategy {
        GreenhouseStrategy::new(HttpContext::new(
            HttpEngine::default(),
            Arc::new(JobMatcher::default()),
        ))
        .with_api_base(base)
    }

    #[test]
    fn test_board_token() {
        assert_eq!(
            GreenhouseStrategy::board_token("https://boards.greenhouse.io/stripe"),
            Some("stripe".into())
        );
        assert_eq!(
            GreenhouseStrategy::board_token("https://boards.greenhouse.io/stripe/jobs/123"),
            Some("stripe".into())
        );
        assert_eq!(
            GreenhouseStrategy::board_token(
                "https://job-boards.greenhouse.io/embed/job_board?for=figma"
            ),
            Some("figma".into())
        );
        assert_eq!(
            GreenhouseStrategy::board_token("https://boards-api.greenhouse.io/v1/boards/acme/jobs"),
            Some("acme".into())
        );
        assert_eq!(GreenhouseStrategy::board_token("https://boards.greenhouse.io/"), None);
    }

    #[test]
    fn test_can_handle() {
        let s = strategy(DEFAULT_API_BASE);
        assert!(s.can_handle("https://boards.greenhouse.io/stripe"));
        assert!(!s.can_handle("https://jobs.lever.co/stripe"));
        assert!(!s.can_handle("https://greenhouse.io.evil.example/stripe"));
    }

    #[tokio::test]
    async fn test_scrape_filters_and_normalizes() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "jobs": [
                {
                    "id": 1,
                    "title": "QA Automation Engineer",
                    "absolute_url": "https://boards.greenhouse.io/acme/jobs/1",
                    "location": { "name": "Remote - US" },
                    "updated_at": "2024-04-02T10:00:00-04:00",
                    "content": "&lt;p&gt;Own our test suites. Full-time.&lt;/p&gt;"
                },
                {
                    "id": 2,
                    "title": "Marketing Manager",
                    "absolute_url": "https://boards.greenhouse.io/acme/jobs/2",
                    "location": { "name": "Remote - US" }
                },
                { "id": 3, "absolute_url": "https://boards.greenhouse.io/acme/jobs/3" }
            ],
            "meta": { "total": 3 }
        });
        Mock::given(method("GET"))
            .and(path("/v1/boards/acme/jobs"))
            .and(wm_query("content", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let request = SearchRequest::new(vec!["QA Engineer".into()], vec!["Remote".into()]);
        let jobs = strategy(&server.uri())
            .scrape("https://boards.greenhouse.io/acme", &request)
            .await
            .unwrap();

        assert_eq!(jobs.len(), 1);
        let job = &jobs[0];
        assert_eq!(job.title(), "QA Automation Engineer");
        assert_eq!(job.company(), "Acme");
        assert_eq!(job.source(), "greenhouse");
        assert_eq!(job.location(), "Remote - US");
        assert_eq!(job.posted_date(), Some("2024-04-02"));
        assert_eq!(job.employment_type(), Some("Full-time"));
        assert_eq!(job.description(), "Own our test suites. Full-time.");
    }

    #[tokio::test]
    async fn test_missing_board_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let request = SearchRequest::new(vec!["QA Engineer".into()], vec!["Remote".into()]);
        let err = strategy(&server.uri())
            .scrape("https://boards.greenhouse.io/ghost", &request)
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Engine(_)));
    }
}
