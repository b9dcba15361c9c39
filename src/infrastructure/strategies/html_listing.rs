// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use tracing::{debug, info};

use super::extract::{
    company_from_host, document_lines, finalize, listing_drafts, text_postings, PostingDraft,
    RecordContext,
};
use super::HttpContext;
use crate::domain::catalog::StrategyKind;
use crate::domain::models::{JobRecord, SearchRequest};
use crate::domain::scraping::{ExtractionStrategy, ScrapeError};
use crate::utils::url_utils::{host_matches, is_http_url};

/// 已知的客户端渲染职位站点，静态 HTML 中没有职位内容
pub const CLIENT_RENDERED_HOSTS: &[&str] = &[
    "myworkdayjobs.com",
    "myworkdaysite.com",
    "taleo.net",
    "icims.com",
    "successfactors.com",
    "oraclecloud.com",
];

/// 服务端渲染的招聘页
///
/// 依次尝试 JSON-LD、卡片选择器、职位链接，最后退化为逐行文本匹配
pub struct HtmlListingStrategy {
    ctx: HttpContext,
}

impl HtmlListingStrategy {
    pub fn new(ctx: HttpContext) -> Self {
        Self { ctx }
    }

    /// 从静态 HTML 中抽取职位草稿
    pub fn parse_listing(html: &str, page_url: &str, min_title_len: usize) -> Vec<PostingDraft> {
        let drafts = listing_drafts(html, page_url, min_title_len);
        if !drafts.is_empty() {
            return drafts;
        }
        let fallback = text_postings(&document_lines(html), min_title_len);
        debug!("{}: {} postings from text fallback", page_url, fallback.len());
        fallback
    }
}

#[async_trait]
impl ExtractionStrategy for HtmlListingStrategy {
    fn name(&self) -> &'static str {
        "html_listing"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::HtmlListing
    }

    fn can_handle(&self, url: &str) -> bool {
        is_http_url(url) && !CLIENT_RENDERED_HOSTS.iter().any(|h| host_matches(url, h))
    }

    async fn scrape(&self, url: &str, request: &SearchRequest) -> Result<Vec<JobRecord>, ScrapeError> {
        let html = self.ctx.http.get_text(url).await?;
        let drafts = Self::parse_listing(&html, url, self.ctx.min_title_len);

        let company = company_from_host(url);
        let ctx = RecordContext {
            company: &company,
            source: self.name(),
            page_url: url,
            min_title_len: self.ctx.min_title_len,
        };
        let jobs = finalize(drafts, &ctx, &self.ctx.matcher, request);
        info!("{}: {} matching postings from static HTML", url, jobs.len());
        Ok(jobs)
    }
}
