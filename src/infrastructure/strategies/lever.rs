// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
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

pub const DEFAULT_API_BASE: &str = "https://api.lever.co";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LeverCategories {
    location: Option<String>,
    commitment: Option<String>,
    #[serde(default)]
    all_locations: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LeverSalary {
    min: Option<f64>,
    max: Option<f64>,
    currency: Option<String>,
    interval: Option<String>,
}

impl LeverSalary {
    fn render(&self) -> Option<String> {
        let range = match (self.min, self.max) {
            (Some(min), Some(max)) => format!("{:.0}-{:.0}", min, max),
            (Some(v), None) | (None, Some(v)) => format!("{:.0}", v),
            (None, None) => return None,
        };
        let mut out = match &self.currency {
            Some(c) => format!("{} {}", c, range),
            None => range,
        };
        if let Some(interval) = &self.interval {
            out.push_str(&format!(" / {}", interval.replace('-', " ")));
        }
        Some(out)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LeverPosting {
    text: String,
    hosted_url: Option<String>,
    apply_url: Option<String>,
    #[serde(default)]
    categories: LeverCategories,
    created_at: Option<i64>,
    description_plain: Option<String>,
    workplace_type: Option<String>,
    salary_range: Option<LeverSalary>,
}

impl LeverPosting {
    fn into_draft(self) -> PostingDraft {
        let location = self.categories.location.clone().or_else(|| {
            (!self.categories.all_locations.is_empty())
                .then(|| self.categories.all_locations.join(" / "))
        });
        let remote = self
            .workplace_type
            .as_deref()
            .map(|w| w.eq_ignore_ascii_case("remote"))
            .filter(|remote| *remote);
        PostingDraft {
            title: self.text,
            url: self.hosted_url.or(self.apply_url),
            location,
            description: self.description_plain,
            posted_date: self
                .created_at
                .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
                .map(|dt| dt.format("%Y-%m-%d").to_string()),
            salary: self.salary_range.as_ref().and_then(LeverSalary::render),
            employment_type: self.categories.commitment,
            remote,
            ..Default::default()
        }
    }
}

/// Lever 职位板
pub struct LeverStrategy {
    ctx: HttpContext,
    api_base: String,
}

impl LeverStrategy {
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

    /// `jobs.lever.co/{company}` -> company
    pub fn company_slug(url: &str) -> Option<String> {
        path_segments(url)
            .into_iter()
            .find(|s| !matches!(s.as_str(), "v0" | "postings"))
    }
}

#[async_trait]
impl ExtractionStrategy for LeverStrategy {
    fn name(&self) -> &'static str {
        "lever"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Lever
    }

    fn can_handle(&self, url: &str) -> bool {
        host_matches(url, "lever.co") && Self::company_slug(url).is_some()
    }

    async fn scrape(&self, url: &str, request: &SearchRequest) -> Result<Vec<JobRecord>, ScrapeError> {
        let slug = Self::company_slug(url).ok_or_else(|| ScrapeError::UnsupportedUrl {
            strategy: self.name(),
            url: url.to_string(),
        })?;
        let api_url = format!("{}/v0/postings/{}?mode=json", self.api_base, slug);
        let postings: Vec<Value> = self.ctx.http.get_json(&api_url).await?;

        let drafts: Vec<PostingDraft> = postings
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<LeverPosting>(value) {
                Ok(posting) => Some(posting.into_draft()),
                Err(e) => {
                    debug!("Skipping malformed Lever posting: {}", e);
                    None
                }
            })
            .collect();

        let company = titleize(&slug);
        let ctx = RecordContext {
            company: &company,
            source: self.name(),
            page_url: url,
            min_title_len: self.ctx.min_title_len,
        };
        let jobs = finalize(drafts, &ctx, &self.ctx.matcher, request);
        info!("Lever company {}: {} matching postings", slug, jobs.len());
        Ok(jobs)
    }
}
