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
use crate::utils::text::titleize;
use crate::utils::url_utils::{host_matches, path_segments};

pub const DEFAULT_API_BASE: &str = "https://api.ashbyhq.com";

#[derive(Debug, Deserialize)]
struct JobBoard {
    #[serde(default)]
    jobs: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct SecondaryLocation {
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Compensation {
    compensation_tier_summary: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AshbyJob {
    title: String,
    location: Option<String>,
    #[serde(default)]
    secondary_locations: Vec<SecondaryLocation>,
    is_remote: Option<bool>,
    is_listed: Option<bool>,
    employment_type: Option<String>,
    description_plain: Option<String>,
    published_at: Option<String>,
    job_url: Option<String>,
    apply_url: Option<String>,
    compensation: Option<Compensation>,
}

impl AshbyJob {
    fn into_draft(self) -> PostingDraft {
        let mut locations: Vec<String> = self.location.into_iter().collect();
        locations.extend(self.secondary_locations.into_iter().filter_map(|l| l.location));
        PostingDraft {
            title: self.title,
            url: self.job_url.or(self.apply_url),
            location: (!locations.is_empty()).then(|| locations.join(" / ")),
            description: self.description_plain,
            posted_date: self.published_at,
            salary: self.compensation.and_then(|c| c.compensation_tier_summary),
            employment_type: self.employment_type,
            remote: self.is_remote.filter(|r| *r),
            ..Default::default()
        }
    }
}

/// Ashby 职位板
pub struct AshbyStrategy {
    ctx: HttpContext,
    api_base: String,
}

impl AshbyStrategy {
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

    pub fn organization(url: &str) -> Option<String> {
        path_segments(url).into_iter().next()
    }
}

#[async_trait]
impl ExtractionStrategy for AshbyStrategy {
    fn name(&self) -> &'static str {
        "ashby"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Ashby
    }

    fn can_handle(&self, url: &str) -> bool {
        host_matches(url, "ashbyhq.com") && Self::organization(url).is_some()
    }

    async fn scrape(&self, url: &str, request: &SearchRequest) -> Result<Vec<JobRecord>, ScrapeError> {
        let org = Self::organization(url).ok_or_else(|| ScrapeError::UnsupportedUrl {
            strategy: self.name(),
            url: url.to_string(),
        })?;
        let api_url = format!(
            "{}/posting-api/job-board/{}?includeCompensation=true",
            self.api_base, org
        );
        let board: JobBoard = self.ctx.http.get_json(&api_url).await?;

        let drafts: Vec<PostingDraft> = board
            .jobs
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<AshbyJob>(value) {
                Ok(job) if job.is_listed == Some(false) => None,
                Ok(job) => Some(job.into_draft()),
                Err(e) => {
                    debug!("Skipping malformed Ashby posting: {}", e);
                    None
                }
            })
            .collect();

        let company = titleize(&org);
        let ctx = RecordContext {
            company: &company,
            source: self.name(),
            page_url: url,
            min_title_len: self.ctx.min_title_len,
        };
        let jobs = finalize(drafts, &ctx, &self.ctx.matcher, request);
        info!("Ashby board {}: {} matching postings", org, jobs.len());
        Ok(jobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::job_matcher::JobMatcher;
    use crate::engines::http_engine::HttpEngine;
    use std::sync::Arc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn strategy(base: &str) -> AshbyStrategy {
        AshbyStrategy::new(HttpContext::new(
            HttpEngine::default(),
            Arc::new(JobMatcher::default()),
        ))
        .with_api_base(base)
    }

    #[tokio::test]
    async fn test_scrape_skips_unlisted_and_maps_remote() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "apiVersion": "1",
            "jobs": [
                {
                    "title": "Machine Learning Engineer",
                    "location": "San Francisco",
                    "secondaryLocations": [{ "location": "New York" }],
                    "isRemote": true,
                    "isListed": true,
                    "employmentType": "FullTime",
                    "descriptionPlain": "Train models.",
                    "publishedAt": "2024-06-10T17:00:00.000+00:00",
                    "jobUrl": "https://jobs.ashbyhq.com/acme/1",
                    "compensation": { "compensationTierSummary": "$200K – $260K" }
                },
                {
                    "title": "Machine Learning Engineer, Ads",
                    "isListed": false,
                    "jobUrl": "https://jobs.ashbyhq.com/acme/2"
                }
            ]
        });
        Mock::given(method("GET"))
            .and(path("/posting-api/job-board/acme"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let request = SearchRequest::new(vec!["ML Engineer".into()], vec!["remote".into()]);
        let jobs = strategy(&server.uri())
            .scrape("https://jobs.ashbyhq.com/acme", &request)
            .await
            .unwrap();

        assert_eq!(jobs.len(), 1);
        let job = &jobs[0];
        assert_eq!(job.location(), "San Francisco / New York");
        assert_eq!(job.remote(), Some(true));
        assert_eq!(job.employment_type(), Some("Full-time"));
        assert_eq!(job.salary(), Some("$200K – $260K"));
        assert_eq!(job.posted_date(), Some("2024-06-10"));
    }

    #[test]
    fn test_can_handle() {
        let s = strategy(DEFAULT_API_BASE);
        assert!(s.can_handle("https://jobs.ashbyhq.com/openai"));
        assert!(!s.can_handle("https://jobs.ashbyhq.com/"));
        assert!(!s.can_handle("https://boards.greenhouse.io/openai"));
    }
}
