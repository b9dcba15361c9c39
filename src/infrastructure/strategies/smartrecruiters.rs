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

pub const DEFAULT_API_BASE: &str = "https://api.smartrecruiters.com";
const JOBS_HOST: &str = "https://jobs.smartrecruiters.com";
const PAGE_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
struct PostingPage {
    #[serde(default)]
    content: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SrLocation {
    city: Option<String>,
    region: Option<String>,
    country: Option<String>,
    remote: Option<bool>,
    full_location: Option<String>,
}

impl SrLocation {
    fn render(&self) -> Option<String> {
        if let Some(full) = self.full_location.as_ref().filter(|f| !f.trim().is_empty()) {
            return Some(full.clone());
        }
        let parts: Vec<String> = [&self.city, &self.region, &self.country]
            .into_iter()
            .flatten()
            .filter(|p| !p.trim().is_empty())
            // country codes arrive lowercase ("us")
            .map(|p| if p.len() == 2 { p.to_uppercase() } else { p.clone() })
            .collect();
        (!parts.is_empty()).then(|| parts.join(", "))
    }
}

#[derive(Debug, Deserialize)]
struct Labeled {
    label: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SrCompany {
    name: Option<String>,
    identifier: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SrPosting {
    id: String,
    name: String,
    released_date: Option<String>,
    #[serde(default)]
    location: SrLocation,
    type_of_employment: Option<Labeled>,
    company: Option<SrCompany>,
}

impl SrPosting {
    fn into_draft(self, company_id: &str) -> PostingDraft {
        let identifier = self
            .company
            .as_ref()
            .and_then(|c| c.identifier.clone())
            .unwrap_or_else(|| company_id.to_string());
        PostingDraft {
            title: self.name,
            url: Some(format!("{}/{}/{}", JOBS_HOST, identifier, self.id)),
            company: self.company.and_then(|c| c.name),
            location: self.location.render(),
            posted_date: self.released_date,
            employment_type: self.type_of_employment.and_then(|t| t.label),
            remote: self.location.remote.filter(|r| *r),
            ..Default::default()
        }
    }
}

/// SmartRecruiters 公开职位接口
pub struct SmartRecruitersStrategy {
    ctx: HttpContext,
    api_base: String,
}

impl SmartRecruitersStrategy {
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

    /// 公司标识区分大小写，例如 `BoschGroup`
    pub fn company_id(url: &str) -> Option<String> {
        path_segments(url)
            .into_iter()
            .find(|s| !matches!(s.as_str(), "v1" | "companies"))
    }
}

#[async_trait]
impl ExtractionStrategy for SmartRecruitersStrategy {
    fn name(&self) -> &'static str {
        "smartrecruiters"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::SmartRecruiters
    }

    fn can_handle(&self, url: &str) -> bool {
        host_matches(url, "smartrecruiters.com") && Self::company_id(url).is_some()
    }

    async fn scrape(&self, url: &str, request: &SearchRequest) -> Result<Vec<JobRecord>, ScrapeError> {
        let company_id = Self::company_id(url).ok_or_else(|| ScrapeError::UnsupportedUrl {
            strategy: self.name(),
            url: url.to_string(),
        })?;
        // the API does keyword search server-side; the matcher still has the final say
        let api_url = format!(
            "{}/v1/companies/{}/postings?q={}&limit={}",
            self.api_base,
            company_id,
            urlencoding::encode(request.primary_title()),
            PAGE_LIMIT
        );
        let page: PostingPage = self.ctx.http.get_json(&api_url).await?;

        let drafts: Vec<PostingDraft> = page
            .content
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<SrPosting>(value) {
                Ok(posting) => Some(posting.into_draft(&company_id)),
                Err(e) => {
                    debug!("Skipping malformed SmartRecruiters posting: {}", e);
                    None
                }
            })
            .collect();

        let company = titleize(&company_id);
        let ctx = RecordContext {
            company: &company,
            source: self.name(),
            page_url: url,
            min_title_len: self.ctx.min_title_len,
        };
        let jobs = finalize(drafts, &ctx, &self.ctx.matcher, request);
        info!("SmartRecruiters {}: {} matching postings", company_id, jobs.len());
        Ok(jobs)
    }
}
