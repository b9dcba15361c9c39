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

#[derive(Debug, Deserialize)]
struct RemoteOkJob {
    position: String,
    company: Option<String>,
    location: Option<String>,
    url: Option<String>,
    apply_url: Option<String>,
    date: Option<String>,
    description: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    salary_min: Option<u64>,
    salary_max: Option<u64>,
}

impl RemoteOkJob {
    fn into_draft(self) -> PostingDraft {
        let salary = match (self.salary_min, self.salary_max) {
            (Some(min), Some(max)) if min > 0 && max > 0 => Some(format!("${} - ${}", min, max)),
            (Some(v), _) | (_, Some(v)) if v > 0 => Some(format!("${}", v)),
            _ => None,
        };
        let location = self
            .location
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| "Remote".to_string());
        // tags carry the role keywords ("qa", "golang") the matcher can use
        let description = format!(
            "{} {}",
            self.tags.join(" "),
            self.description.map(|d| html_to_text(&d)).unwrap_or_default()
        );
        PostingDraft {
            title: self.position,
            url: self.url.or(self.apply_url),
            company: self.company,
            location: Some(location),
            description: Some(description),
            posted_date: self.date,
            salary,
            remote: Some(true),
            ..Default::default()
        }
    }
}

/// RemoteOK 公开接口
///
/// 返回数组的第一个元素是法律声明，不是职位
pub struct RemoteOkAggregator {
    http: HttpEngine,
    base_url: String,
}

impl RemoteOkAggregator {
    pub fn new(http: HttpEngine, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl JobAggregator for RemoteOkAggregator {
    fn name(&self) -> &'static str {
        "remoteok"
    }

    async fn fetch(&self, _request: &SearchRequest) -> Result<Vec<JobRecord>, ScrapeError> {
        let items: Vec<Value> = self.http.get_json(&self.base_url).await?;

        let drafts: Vec<PostingDraft> = items
            .into_iter()
            .filter(|item| item.get("position").is_some())
            .filter_map(|value| match serde_json::from_value::<RemoteOkJob>(value) {
                Ok(job) => Some(job.into_draft()),
                Err(e) => {
                    debug!("Skipping malformed RemoteOK posting: {}", e);
                    None
                }
            })
            .collect();

        let ctx = RecordContext {
            company: "",
            source: self.name(),
            page_url: &self.base_url,
            min_title_len: 1,
        };
        let jobs = to_records(drafts, &ctx);
        info!("RemoteOK returned {} postings", jobs.len());
        Ok(jobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_skips_legal_notice() {
        let server = MockServer::start().await;
        let body = serde_json::json!([
            { "last_updated": 1714600000, "legal": "API Terms of Service apply" },
            {
                "id": "101",
                "epoch": 1714600000,
                "date": "2024-05-01T22:13:20+00:00",
                "company": "Acme",
                "position": "Senior Golang Developer",
                "tags": ["golang", "backend"],
                "location": "",
                "salary_min": 100000,
                "salary_max": 150000,
                "url": "https://remoteok.com/remote-jobs/101"
            },
            {
                "id": "102",
                "company": "Beta",
                "position": "Support Engineer",
                "salary_min": 0,
                "salary_max": 0,
                "apply_url": "https://beta.example/apply"
            }
        ]);
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let aggregator = RemoteOkAggregator::new(HttpEngine::default(), &server.uri());
        let request = SearchRequest::new(vec!["Developer".into()], vec!["remote".into()]);
        let jobs = aggregator.fetch(&request).await.unwrap();

        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].location(), "Remote");
        assert_eq!(jobs[0].salary(), Some("$100000 - $150000"));
        assert_eq!(jobs[0].posted_date(), Some("2024-05-01"));
        assert_eq!(jobs[1].url(), "https://beta.example/apply");
        assert_eq!(jobs[1].salary(), None);
    }
}
