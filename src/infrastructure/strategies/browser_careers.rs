// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::extract::{
    company_from_host, document_lines, finalize, listing_drafts, text_postings, PostingDraft,
    RecordContext,
};
use super::BrowserContext;
use crate::domain::catalog::StrategyKind;
use crate::domain::models::{JobRecord, SearchRequest};
use crate::domain::scraping::{ExtractionStrategy, ScrapeError};
use crate::engines::browser_engine::{BrowserSession, FrameDocument, PageSnapshot};
use crate::utils::url_utils::{absolutize, is_http_url};

// Any of these means the listing has rendered
const READY_SELECTORS: &[&str] = &[
    "script[type='application/ld+json']",
    "[data-job-id]",
    "[class*='job-card']",
    "[class*='JobCard']",
    "[class*='job-listing']",
    "li[class*='job']",
    "a[href*='/jobs/']",
    "a[href*='/job/']",
    "[role='listitem']",
    "iframe",
];

const CONSENT_BUTTONS: &[&str] = &[
    "#onetrust-accept-btn-handler",
    "button[aria-label*='Accept']",
    "button[data-testid*='accept']",
];

const MAX_CROSS_ORIGIN_FRAMES: usize = 3;

/// 通用的客户端渲染招聘页
///
/// 加载页面、处理 cookie 弹窗、滚动触发懒加载，并进入 iframe 查找职位
pub struct BrowserCareersStrategy {
    ctx: BrowserContext,
}

impl BrowserCareersStrategy {
    pub fn new(ctx: BrowserContext) -> Self {
        Self { ctx }
    }

    fn documents(snapshot: &PageSnapshot) -> Vec<(&str, &str)> {
        let mut docs = vec![(snapshot.url.as_str(), snapshot.html.as_str())];
        for frame in &snapshot.frames {
            if let Some(html) = frame.html.as_deref() {
                let base = if is_http_url(&frame.src) {
                    frame.src.as_str()
                } else {
                    snapshot.url.as_str()
                };
                docs.push((base, html));
            }
        }
        docs
    }

    /// 从渲染快照中抽取职位草稿
    ///
    /// 所有文档（主页面与各 frame）都没有结构化结果时，才退化为可见文本匹配
    pub fn extract_from_snapshot(snapshot: &PageSnapshot, min_title_len: usize) -> Vec<PostingDraft> {
        let mut drafts = Vec::new();
        for (base, html) in Self::documents(snapshot) {
            for mut draft in listing_drafts(html, base, min_title_len) {
                // frame links are relative to the frame document
                draft.url = draft.url.and_then(|u| absolutize(base, &u));
                drafts.push(draft);
            }
        }
        if !drafts.is_empty() {
            return drafts;
        }

        let mut fallback = text_postings(&snapshot.body_text, min_title_len);
        for frame in &snapshot.frames {
            if let Some(html) = frame.html.as_deref() {
                fallback.extend(text_postings(&document_lines(html), min_title_len));
            }
        }
        debug!(
            "{}: {} postings from visible text",
            snapshot.url,
            fallback.len()
        );
        fallback
    }

    async fn capture(&self, session: &BrowserSession, url: &str) -> Result<PageSnapshot, ScrapeError> {
        session.goto(url).await?;

        for selector in CONSENT_BUTTONS {
            if session.click_if_present(selector).await {
                debug!("Dismissed consent banner via {}", selector);
                break;
            }
        }

        let wait = session.config().element_wait_timeout;
        if session.wait_for_any(READY_SELECTORS, wait).await.is_none() {
            debug!("No listing markers appeared at {} within {:?}", url, wait);
        }
        session.scroll_to_bottom(session.config().scroll_rounds).await;

        let mut snapshot = session.snapshot(url).await?;
        let cross_origin: Vec<String> = snapshot
            .cross_origin_frames()
            .into_iter()
            .take(MAX_CROSS_ORIGIN_FRAMES)
            .map(str::to_string)
            .collect();
        for src in cross_origin {
            let html = match session.goto(&src).await {
                Ok(()) => session.content().await,
                Err(e) => Err(e),
            };
            match html {
                Ok(html) => snapshot.frames.push(FrameDocument {
                    src,
                    html: Some(html),
                }),
                Err(e) => debug!("Could not load frame {}: {}", src, e),
            }
        }
        Ok(snapshot)
    }
}

#[async_trait]
impl ExtractionStrategy for BrowserCareersStrategy {
    fn name(&self) -> &'static str {
        "browser_careers"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::BrowserCareers
    }

    fn can_handle(&self, url: &str) -> bool {
        is_http_url(url)
    }

    async fn scrape(&self, url: &str, request: &SearchRequest) -> Result<Vec<JobRecord>, ScrapeError> {
        let session = self.ctx.browser.open_session().await?;
        let result = self.capture(&session, url).await;
        session.close().await;

        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Browser scrape failed for {}: {}", url, e);
                return Err(e);
            }
        };

        let drafts = Self::extract_from_snapshot(&snapshot, self.ctx.min_title_len);
        let company = company_from_host(url);
        let ctx = RecordContext {
            company: &company,
            source: self.name(),
            page_url: url,
            min_title_len: self.ctx.min_title_len,
        };
        let jobs = finalize(drafts, &ctx, &self.ctx.matcher, request);
        info!("{}: {} matching postings from rendered page", url, jobs.len());
        Ok(jobs)
    }
}
