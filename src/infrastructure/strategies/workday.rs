// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use super::extract::{finalize, PostingDraft, RecordContext};
use super::BrowserContext;
use crate::domain::catalog::StrategyKind;
use crate::domain::models::{JobRecord, SearchRequest};
use crate::domain::scraping::{ExtractionStrategy, ScrapeError};
use crate::engines::browser_engine::BrowserSession;
use crate::utils::text::{clean_text, titleize};
use crate::utils::url_utils::{host_matches, host_of};

const JOB_TITLE: &str = "a[data-automation-id='jobTitle']";
const RESULTS: &str = "[data-automation-id='jobResults']";
const FOUND_TEXT: &str = "[data-automation-id='jobFoundText']";
const NEXT_BUTTON: &str = "button[data-uxi-widget-type='stepToNextButton'], button[aria-label='next']";
const DEFAULT_MAX_PAGES: usize = 3;

static CARD: Lazy<Selector> =
    Lazy::new(|| Selector::parse("li:has(a[data-automation-id='jobTitle'])").unwrap());
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse(JOB_TITLE).unwrap());
static LOCATION: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[data-automation-id='locations'] dd").unwrap());
static LOCATION_BLOCK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[data-automation-id='locations']").unwrap());
static POSTED: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[data-automation-id='postedOn'] dd").unwrap());
static REMOTE_TYPE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[data-automation-id='remoteType'] dd").unwrap());

fn first_text(card: ElementRef<'_>, selector: &Selector) -> Option<String> {
    card.select(selector)
        .next()
        .map(|el| clean_text(&el.text().collect::<Vec<_>>().join(" ")))
        .filter(|t| !t.is_empty())
}

/// Workday 招聘站点
///
/// 页面完全由前端渲染，使用浏览器加载并按页收集结果
pub struct WorkdayStrategy {
    ctx: BrowserContext,
    max_pages: usize,
}

impl WorkdayStrategy {
    pub fn new(ctx: BrowserContext) -> Self {
        Self {
            ctx,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// 租户名，例如 `nvidia.wd5.myworkdayjobs.com` -> `Nvidia`
    pub fn tenant_name(url: &str) -> String {
        host_of(url)
            .and_then(|h| h.split('.').next().map(titleize))
            .unwrap_or_default()
    }

    /// 在站点地址上附加关键词查询
    pub fn search_url(url: &str, request: &SearchRequest) -> String {
        match Url::parse(url) {
            Ok(mut parsed) => {
                parsed
                    .query_pairs_mut()
                    .append_pair("q", request.primary_title());
                parsed.to_string()
            }
            Err(_) => url.to_string(),
        }
    }

    /// 解析一页渲染后的结果列表
    pub fn parse_results(html: &str) -> Vec<PostingDraft> {
        let document = Html::parse_document(html);
        let cards: Vec<ElementRef<'_>> = document.select(&CARD).collect();

        if cards.is_empty() {
            // layout without list items: titles only
            return document
                .select(&TITLE)
                .map(|a| {
                    PostingDraft::new(a.text().collect::<String>())
                        .with_url(a.value().attr("href").map(str::to_string))
                })
                .collect();
        }

        cards
            .into_iter()
            .filter_map(|card| {
                let anchor = card.select(&TITLE).next()?;
                let remote = first_text(card, &REMOTE_TYPE)
                    .map(|t| t.to_lowercase().contains("remote"))
                    .filter(|r| *r);
                Some(PostingDraft {
                    title: anchor.text().collect::<String>(),
                    url: anchor.value().attr("href").map(str::to_string),
                    location: first_text(card, &LOCATION)
                        .or_else(|| first_text(card, &LOCATION_BLOCK)),
                    posted_date: first_text(card, &POSTED),
                    remote,
                    ..Default::default()
                })
            })
            .collect()
    }

    async fn collect_pages(&self, session: &BrowserSession, url: &str) -> Result<Vec<String>, ScrapeError> {
        let wait = session.config().element_wait_timeout;
        session.goto(url).await?;

        if session.wait_for_any(&[JOB_TITLE, RESULTS], wait).await.is_none() {
            let found = session.inner_text(FOUND_TEXT).await.unwrap_or_default();
            if found.trim_start().starts_with('0') {
                debug!("Workday search returned no jobs: {}", found);
                return Ok(Vec::new());
            }
            return Err(ScrapeError::Structure(format!(
                "job list did not render at {}",
                url
            )));
        }

        let mut pages = Vec::new();
        loop {
            pages.push(session.content().await?);
            if pages.len() >= self.max_pages {
                break;
            }
            let first_title = session.inner_text(JOB_TITLE).await.unwrap_or_default();
            if !session.click_if_present(NEXT_BUTTON).await {
                break;
            }
            if !session.wait_for_text_change(JOB_TITLE, &first_title, wait).await {
                debug!("Workday pagination stalled after {} pages", pages.len());
                break;
            }
        }
        Ok(pages)
    }
}

#[async_trait]
impl ExtractionStrategy for WorkdayStrategy {
    fn name(&self) -> &'static str {
        "workday"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Workday
    }

    fn can_handle(&self, url: &str) -> bool {
        host_matches(url, "myworkdayjobs.com") || host_matches(url, "myworkdaysite.com")
    }

    async fn scrape(&self, url: &str, request: &SearchRequest) -> Result<Vec<JobRecord>, ScrapeError> {
        let search_url = Self::search_url(url, request);
        let session = self.ctx.browser.open_session().await?;
        let result = self.collect_pages(&session, &search_url).await;
        session.close().await;

        let pages = match result {
            Ok(pages) => pages,
            Err(e) => {
                warn!("Workday scrape failed for {}: {}", url, e);
                return Err(e);
            }
        };

        let drafts: Vec<PostingDraft> = pages.iter().flat_map(|html| Self::parse_results(html)).collect();
        let company = Self::tenant_name(url);
        let ctx = RecordContext {
            company: &company,
            source: self.name(),
            page_url: url,
            min_title_len: self.ctx.min_title_len,
        };
        let jobs = finalize(drafts, &ctx, &self.ctx.matcher, request);
        info!(
            "Workday {}: {} matching postings over {} pages",
            company,
            jobs.len(),
            pages.len()
        );
        Ok(jobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body><section data-automation-id="jobResults">
      <p data-automation-id="jobFoundText">2 JOBS FOUND</p>
      <ul role="list">
        <li class="css-1q2dra3">
          <div><h3><a data-automation-id="jobTitle" href="/en-US/External/job/US-CA-Santa-Clara/Senior-SDET_JR1980001">Senior SDET</a></h3></div>
          <div data-automation-id="locations"><dl><dt>locations</dt><dd>US, CA, Santa Clara</dd></dl></div>
          <div data-automation-id="remoteType"><dl><dt>remote type</dt><dd>Fully Remote</dd></dl></div>
          <div data-automation-id="postedOn"><dl><dt>posted on</dt><dd>Posted 2 Days Ago</dd></dl></div>
        </li>
        <li class="css-1q2dra3">
          <div><h3><a data-automation-id="jobTitle" href="/en-US/External/job/US-TX-Austin/Hardware-Engineer_JR1980002">Hardware Engineer</a></h3></div>
          <div data-automation-id="locations"><dl><dt>locations</dt><dd>US, TX, Austin</dd></dl></div>
        </li>
      </ul></section></body></html>"#;

    #[test]
    fn test_parse_results_reads_automation_ids() {
        let drafts = WorkdayStrategy::parse_results(PAGE);
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].title, "Senior SDET");
        assert_eq!(drafts[0].location.as_deref(), Some("US, CA, Santa Clara"));
        assert_eq!(drafts[0].posted_date.as_deref(), Some("Posted 2 Days Ago"));
        assert_eq!(drafts[0].remote, Some(true));
        assert_eq!(drafts[1].remote, None);
        assert_eq!(
            drafts[1].url.as_deref(),
            Some("/en-US/External/job/US-TX-Austin/Hardware-Engineer_JR1980002")
        );
    }

    #[test]
    fn test_parse_results_without_list_items() {
        let html = r#"<div><a data-automation-id="jobTitle" href="/job/1">Test Engineer</a></div>"#;
        let drafts = WorkdayStrategy::parse_results(html);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].url.as_deref(), Some("/job/1"));
    }

    #[test]
    fn test_records_resolve_against_tenant_site() {
        let url = "https://acme.wd5.myworkdayjobs.com/External";
        let request = SearchRequest::new(vec!["QA Engineer".into()], vec!["remote".into()]);
        let ctx = RecordContext {
            company: &WorkdayStrategy::tenant_name(url),
            source: "workday",
            page_url: url,
            min_title_len: 4,
        };
        let jobs = finalize(
            WorkdayStrategy::parse_results(PAGE),
            &ctx,
            &crate::domain::services::job_matcher::JobMatcher::default(),
            &request,
        );
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].company(), "Acme");
        assert_eq!(
            jobs[0].url(),
            "https://acme.wd5.myworkdayjobs.com/en-US/External/job/US-CA-Santa-Clara/Senior-SDET_JR1980001"
        );
    }

    #[test]
    fn test_search_url_appends_query() {
        let request = SearchRequest::new(vec!["QA Engineer".into()], vec![]);
        assert_eq!(
            WorkdayStrategy::search_url("https://acme.wd5.myworkdayjobs.com/External", &request),
            "https://acme.wd5.myworkdayjobs.com/External?q=QA+Engineer"
        );
    }
}
