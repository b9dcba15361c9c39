// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::domain::models::{JobRecord, SearchRequest};
use crate::domain::scraping::{JobAggregator, ScrapeError};
use crate::engines::http_engine::HttpEngine;
use crate::infrastructure::strategies::extract::{to_records, PostingDraft, RecordContext};
use crate::utils::text::html_to_text;

const RESULT_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
struct RemotiveResponse {
    #[serde(default)]
    jobs: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RemotiveJob {
    url: String,
    title: String,
    company_name: Option<String>,
    job_type: Option<String>,
    publication_date: Option<String>,
    candidate_required_location: Option<String>,
    salary: Option<String>,
    description: Option<String>,
}

impl RemotiveJob {
    fn into_draft(self) -> PostingDraft {
        let location = match self.candidate_required_location.as_deref().map(str::trim) {
            Some(region) if !region.is_empty() => format!("Remote - {}", region),
            _ => "Remote".to_string(),
        };
        PostingDraft {
            title: self.title,
            url: Some(self.url),
            company: self.company_name,
            location: Some(location),
            description: self.description.map(|d| html_to_text(&d)),
            posted_date: self.publication_date,
            salary: self.salary.filter(|s| !s.trim().is_empty()),
            employment_type: self.job_type.filter(|t| !t.trim().is_empty()),
            remote: Some(true),
        }
    }
}

/// Remotive 远程职位接口
pub struct RemotiveAggregator {
    http: HttpEngine,
    base_url: String,
}

impl RemotiveAggregator {
    pub fn new(http: HttpEngine, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl JobAggregator for RemotiveAggregator {
    fn name(&self) -> &'static str {
        "remotive"
    }

    async fn fetch(&self, request: &SearchRequest) -> Result<Vec<JobRecord>, ScrapeError> {
        let url = format!(
            "{}?search={}&limit={}",
            self.base_url,
            urlencoding::encode(request.primary_title()),
            RESULT_LIMIT
        );
        let response: RemotiveResponse = self.http.get_json(&url).await?;

        let drafts: Vec<PostingDraft> = response
            .jobs
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<RemotiveJob>(value) {
                Ok(job) => Some(job.into_draft()),
                Err(e) => {
                    debug!("Skipping malformed Remotive posting: {}", e);
                    None
                }
            })
            .collect();

        // postings without a company are dropped by the empty fallback name
        let ctx = RecordContext {
            company: "",
            source: self.name(),
            page_url: &self.base_url,
            min_title_len: 1,
        };
        let jobs = to_records(drafts, &ctx);
        info!("Remotive returned {} postings", jobs.len());
        Ok(jobs)
    }
}
