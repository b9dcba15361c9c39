// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 职位抽取的公共工具
//!
//! 所有策略先产出 `PostingDraft`，再统一经过 `finalize` 清洗、校验、
//! 去重并由匹配引擎过滤，得到最终的 `JobRecord`。

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::debug;

use crate::domain::models::{JobRecord, SearchRequest};
use crate::domain::services::job_matcher::{JobMatcher, REMOTE_MARKERS};
use crate::utils::text::{clean_text, html_to_text, slugify, snippet, titleize};
use crate::utils::url_utils::absolutize;

pub const DEFAULT_MIN_TITLE_LEN: usize = 4;

/// 描述摘要的最大字符数
pub const DESCRIPTION_CHARS: usize = 280;

const MAX_TITLE_CHARS: usize = 150;

// Substrings that mark legal, consent or navigation text rather than a posting
const BOILERPLATE_PHRASES: &[&str] = &[
    "privacy",
    "cookie",
    "terms of",
    "terms and conditions",
    "all rights reserved",
    "copyright",
    "skip to",
    "back to top",
    "sign in",
    "log in",
    "sign up",
    "subscribe",
    "newsletter",
    "equal opportunity",
    "job alert",
    "view all",
    "see all",
    "search jobs",
    "powered by",
];

const NAV_TITLES: &[&str] = &[
    "home",
    "careers",
    "jobs",
    "apply",
    "apply now",
    "learn more",
    "read more",
    "contact",
    "contact us",
    "about",
    "about us",
    "legal",
    "sitemap",
    "benefits",
    "login",
    "open positions",
    "open roles",
    "teams",
    "locations",
    "next",
    "previous",
    "menu",
    "filter",
    "share",
];

const JOB_LINK_MARKERS: &[&str] = &[
    "/job/",
    "/jobs/",
    "/career/",
    "/careers/",
    "/position",
    "/opening",
    "/vacanc",
    "/posting",
    "/requisition",
    "/req/",
    "gh_jid=",
    "jobid=",
    "job_id=",
];

const LISTING_ROOTS: &[&str] = &[
    "jobs", "careers", "career", "positions", "openings", "search", "vacancies",
];

static LD_JSON: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script[type='application/ld+json']").unwrap());
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

static SALARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:[$€£]|usd|eur|gbp)\s?\d{1,3}(?:[,.]\d{3})*(?:\.\d+)?\s?k?(?:\s*(?:-|–|to)\s*(?:[$€£]|usd|eur|gbp)?\s?\d{1,3}(?:[,.]\d{3})*(?:\.\d+)?\s?k?)?",
    )
    .unwrap()
});
static EMPLOYMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(full[- ]?time|part[- ]?time|contract(?:or)?|intern(?:ship)?|temporary)\b")
        .unwrap()
});
static ROLE_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(engineer|developer|manager|designer|analyst|scientist|architect|specialist|consultant|director|lead|administrator|technician|coordinator|intern|sdet|recruiter|writer|researcher|tester)\b",
    )
    .unwrap()
});

/// 卡片式列表布局：容器、标题、地点
struct CardLayout {
    container: Selector,
    title: Selector,
    location: Selector,
}

fn layout(container: &str, title: &str, location: &str) -> CardLayout {
    CardLayout {
        container: Selector::parse(container).unwrap(),
        title: Selector::parse(title).unwrap(),
        location: Selector::parse(location).unwrap(),
    }
}

// Ordered from most specific to most generic
static CARD_LAYOUTS: Lazy<Vec<CardLayout>> = Lazy::new(|| {
    vec![
        // Greenhouse hosted board
        layout("div.opening", "a", "span.location, .location"),
        // Lever hosted board
        layout(
            "div.posting",
            "[data-qa='posting-name'], h5",
            ".sort-by-location, .location, .posting-categories .location",
        ),
        // Workday result list
        layout(
            "li:has([data-automation-id='jobTitle'])",
            "[data-automation-id='jobTitle']",
            "[data-automation-id='locations'] dd, [data-automation-id='locations']",
        ),
        layout(
            "[data-job-id], [data-jobid], [data-qa='job-card'], [data-testid*='job-card']",
            "h2, h3, h4, [class*='title'], a",
            "[class*='location'], [data-testid*='location']",
        ),
        layout(
            ".job-listing, .job-card, .job-item, .job-result, .jobs-list-item, .job",
            "h2, h3, h4, [class*='title'], a",
            "[class*='location']",
        ),
        layout(
            "li[class*='job'], article[class*='job'], div[class*='job-']",
            "h2, h3, h4, [class*='title'], a",
            "[class*='location']",
        ),
        layout(
            "li[class*='position'], div[class*='position'], li[class*='opening'], div[class*='opening'], tr[class*='job']",
            "h2, h3, h4, [class*='title'], a, td",
            "[class*='location'], td.location",
        ),
        layout("[role='listitem']", "h2, h3, h4, a", "[class*='location']"),
    ]
});

/// 抽取中间结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostingDraft {
    pub title: String,
    pub url: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub posted_date: Option<String>,
    pub salary: Option<String>,
    pub employment_type: Option<String>,
    pub remote: Option<bool>,
}

impl PostingDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_url(mut self, url: Option<String>) -> Self {
        self.url = url;
        self
    }

    pub fn with_location(mut self, location: Option<String>) -> Self {
        self.location = location;
        self
    }

    /// 转换为 `JobRecord`，标题不可信或必填字段缺失时返回 None
    pub fn into_record(self, ctx: &RecordContext<'_>) -> Option<JobRecord> {
        let title = clean_text(&self.title);
        if !is_plausible_title(&title, ctx.min_title_len) {
            debug!("Discarding implausible title {:?}", title);
            return None;
        }

        let url = self
            .url
            .as_deref()
            .and_then(|u| absolutize(ctx.page_url, u))
            .unwrap_or_else(|| synthesize_url(ctx.page_url, &title));
        let company = self
            .company
            .map(|c| clean_text(&c))
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| ctx.company.to_string());
        let location = self.location.map(|l| clean_text(&l)).unwrap_or_default();
        let full_description = self.description.map(|d| clean_text(&d)).unwrap_or_default();

        let salary = self.salary.or_else(|| extract_salary(&full_description));
        let employment_type = self
            .employment_type
            .map(|e| normalize_employment_type(&e))
            .or_else(|| detect_employment_type(&title))
            .or_else(|| detect_employment_type(&full_description));
        let remote = self
            .remote
            .or_else(|| detect_remote(&location))
            .or_else(|| detect_remote(&title));

        match JobRecord::new(title, company, url, ctx.source) {
            Ok(record) => Some(
                record
                    .with_location(location)
                    .with_description(snippet(&full_description, DESCRIPTION_CHARS))
                    .with_posted_date(self.posted_date.map(|d| iso_date_prefix(&d)))
                    .with_salary(salary)
                    .with_employment_type(employment_type)
                    .with_remote(remote),
            ),
            Err(e) => {
                debug!("Discarding posting: {}", e);
                None
            }
        }
    }
}

/// 记录转换上下文
#[derive(Debug, Clone, Copy)]
pub struct RecordContext<'a> {
    /// 来源未给出雇主名时使用
    pub company: &'a str,
    pub source: &'a str,
    /// 用于解析相对链接与合成链接
    pub page_url: &'a str,
    pub min_title_len: usize,
}

/// 转换并按 URL 去重，不做匹配过滤
pub fn to_records(drafts: Vec<PostingDraft>, ctx: &RecordContext<'_>) -> Vec<JobRecord> {
    let mut seen = HashSet::new();
    drafts
        .into_iter()
        .filter_map(|d| d.into_record(ctx))
        .filter(|r| seen.insert(r.url().to_string()))
        .collect()
}

/// 转换、按 URL 去重并用匹配引擎过滤
pub fn finalize(
    drafts: Vec<PostingDraft>,
    ctx: &RecordContext<'_>,
    matcher: &JobMatcher,
    request: &SearchRequest,
) -> Vec<JobRecord> {
    let total = drafts.len();
    let records = to_records(drafts, ctx);
    let valid = records.len();
    let matched = matcher.filter(records, request);
    debug!(
        "{}: {} drafts, {} valid, {} matched",
        ctx.source,
        total,
        valid,
        matched.len()
    );
    matched
}

/// 由主机名推断雇主名，例如 `careers.acme-corp.com` -> `Acme Corp`
pub fn company_from_host(url: &str) -> String {
    let host = crate::utils::url_utils::host_of(url).unwrap_or_default();
    let label = host
        .split('.')
        .find(|l| !matches!(*l, "www" | "careers" | "jobs" | "career" | "apply"))
        .unwrap_or(host.as_str());
    titleize(label)
}

/// 页面可见文本，每个文本节点一行
pub fn document_lines(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut lines = Vec::new();
    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let in_code = node
            .parent()
            .and_then(|p| {
                p.value()
                    .as_element()
                    .map(|e| matches!(e.name(), "script" | "style" | "noscript" | "template"))
            })
            .unwrap_or(false);
        if in_code {
            continue;
        }
        let line = clean_text(text);
        if !line.is_empty() {
            lines.push(line);
        }
    }
    lines.join("\n")
}

/// 标题是否像一个真实职位
pub fn is_plausible_title(title: &str, min_len: usize) -> bool {
    let len = title.chars().count();
    if len < min_len || len > MAX_TITLE_CHARS {
        return false;
    }
    if !title.chars().any(|c| c.is_alphabetic()) {
        return false;
    }
    let lower = title.to_lowercase();
    if NAV_TITLES.contains(&lower.trim()) {
        return false;
    }
    !BOILERPLATE_PHRASES.iter().any(|p| lower.contains(p))
}

/// 无链接职位的合成地址：页面地址加标题 slug 片段
pub fn synthesize_url(page_url: &str, title: &str) -> String {
    let base = page_url.split('#').next().unwrap_or(page_url);
    format!("{}#{}", base, slugify(title))
}

/// 从地点或标题判断是否远程
pub fn detect_remote(text: &str) -> Option<bool> {
    let lower = text.to_lowercase();
    REMOTE_MARKERS
        .iter()
        .any(|m| lower.contains(m))
        .then_some(true)
}

pub fn detect_employment_type(text: &str) -> Option<String> {
    EMPLOYMENT
        .find(text)
        .map(|m| normalize_employment_type(m.as_str()))
}

/// 统一雇佣类型写法，例如 `FULL_TIME`、`FullTime` -> `Full-time`
pub fn normalize_employment_type(raw: &str) -> String {
    let compact: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect();
    match compact.as_str() {
        "fulltime" | "permanent" => "Full-time".to_string(),
        "parttime" => "Part-time".to_string(),
        "contract" | "contractor" => "Contract".to_string(),
        "intern" | "internship" => "Internship".to_string(),
        "temporary" | "temp" => "Temporary".to_string(),
        _ => clean_text(raw),
    }
}

pub fn extract_salary(text: &str) -> Option<String> {
    SALARY
        .find(text)
        .map(|m| m.as_str().trim().to_string())
        // a bare currency amount below 1000 is not a salary
        .filter(|s| s.chars().filter(|c| c.is_ascii_digit()).count() >= 3 || s.to_lowercase().contains('k'))
}

/// ISO 时间戳截取日期部分，其他格式原样保留
pub fn iso_date_prefix(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.get(..10) {
        Some(prefix) if NaiveDate::parse_from_str(prefix, "%Y-%m-%d").is_ok() => prefix.to_string(),
        _ => trimmed.to_string(),
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

/// 依次尝试 JSON-LD、卡片布局和职位链接，返回第一个产出可信标题的阶段的结果
pub fn listing_drafts(html: &str, page_url: &str, min_title_len: usize) -> Vec<PostingDraft> {
    let document = Html::parse_document(html);
    let plausible = |drafts: Vec<PostingDraft>| -> Vec<PostingDraft> {
        drafts
            .into_iter()
            .filter(|d| is_plausible_title(&clean_text(&d.title), min_title_len))
            .collect()
    };

    let from_ld = plausible(json_ld_postings(&document));
    if !from_ld.is_empty() {
        debug!("{}: {} postings from JSON-LD", page_url, from_ld.len());
        return from_ld;
    }

    for (i, layout) in CARD_LAYOUTS.iter().enumerate() {
        let drafts = plausible(card_postings(&document, layout));
        if !drafts.is_empty() {
            debug!("{}: {} postings from card layout {}", page_url, drafts.len(), i + 1);
            return drafts;
        }
    }

    let anchors = plausible(anchor_postings(&document, page_url));
    debug!("{}: {} postings from job links", page_url, anchors.len());
    anchors
}

fn card_postings(document: &Html, layout: &CardLayout) -> Vec<PostingDraft> {
    document
        .select(&layout.container)
        // skip wrappers that contain further cards
        .filter(|card| {
            !card
                .descendants()
                .skip(1)
                .filter_map(ElementRef::wrap)
                .any(|el| layout.container.matches(&el))
        })
        .filter_map(|card| {
            let title = card.select(&layout.title).next().map(element_text)?;
            let url = if card.value().name() == "a" {
                card.value().attr("href").map(str::to_string)
            } else {
                card.select(&LINK)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .map(str::to_string)
            };
            let location = card
                .select(&layout.location)
                .next()
                .map(element_text)
                .filter(|l| !l.is_empty());
            Some(PostingDraft::new(title).with_url(url).with_location(location))
        })
        .collect()
}

fn anchor_postings(document: &Html, page_url: &str) -> Vec<PostingDraft> {
    let page = page_url.split('#').next().unwrap_or(page_url).trim_end_matches('/');
    document
        .select(&LINK)
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            let lower = href.to_lowercase();
            if !JOB_LINK_MARKERS.iter().any(|m| lower.contains(m)) {
                return None;
            }
            let absolute = absolutize(page_url, href)?;
            if absolute.trim_end_matches('/') == page {
                return None;
            }
            let last = crate::utils::url_utils::path_segments(&absolute)
                .pop()
                .unwrap_or_default()
                .to_lowercase();
            if LISTING_ROOTS.contains(&last.as_str()) && !lower.contains('=') {
                return None;
            }
            Some(PostingDraft::new(element_text(a)).with_url(Some(absolute)))
        })
        .collect()
}

/// 纯文本兜底：按行寻找带有职位名词的短行，下一行像地点时作为地点
pub fn text_postings(text: &str, min_title_len: usize) -> Vec<PostingDraft> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut drafts = Vec::new();
    let mut seen = HashSet::new();
    for (i, line) in lines.iter().enumerate() {
        let len = line.chars().count();
        if !(6..=100).contains(&len) || !ROLE_WORD.is_match(line) {
            continue;
        }
        if !is_plausible_title(line, min_title_len) || line.ends_with('.') {
            continue;
        }
        if !seen.insert(line.to_lowercase()) {
            continue;
        }
        let location = lines
            .get(i + 1)
            .filter(|next| looks_like_location(next))
            .map(|next| next.to_string());
        drafts.push(PostingDraft::new(*line).with_location(location));
    }
    drafts
}

fn looks_like_location(line: &str) -> bool {
    if line.chars().count() > 60 || ROLE_WORD.is_match(line) {
        return false;
    }
    line.contains(',') || detect_remote(line).is_some()
}

/// 解析页面中的 schema.org JobPosting
pub fn json_ld_postings(document: &Html) -> Vec<PostingDraft> {
    let mut out = Vec::new();
    for script in document.select(&LD_JSON) {
        let raw = script.text().collect::<String>();
        match serde_json::from_str::<Value>(raw.trim()) {
            Ok(value) => collect_job_postings(&value, &mut out),
            Err(e) => debug!("Skipping malformed JSON-LD block: {}", e),
        }
    }
    out
}

fn collect_job_postings(value: &Value, out: &mut Vec<PostingDraft>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_job_postings(item, out);
            }
        }
        Value::Object(map) => {
            if has_type(map.get("@type"), "JobPosting") {
                if let Some(draft) = posting_from_ld(map) {
                    out.push(draft);
                }
            }
            for nested in ["@graph", "itemListElement", "item"] {
                if let Some(inner) = map.get(nested) {
                    collect_job_postings(inner, out);
                }
            }
        }
        _ => {}
    }
}

fn has_type(value: Option<&Value>, name: &str) -> bool {
    match value {
        Some(Value::String(s)) => s == name,
        Some(Value::Array(items)) => items.iter().any(|v| v.as_str() == Some(name)),
        _ => false,
    }
}

fn ld_str(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn posting_from_ld(map: &Map<String, Value>) -> Option<PostingDraft> {
    let title = ld_str(map.get("title")).or_else(|| ld_str(map.get("name")))?;
    let employment_type = match map.get("employmentType") {
        Some(Value::Array(items)) => items.first().and_then(|v| ld_str(Some(v))),
        other => ld_str(other),
    };
    let remote = map
        .get("jobLocationType")
        .and_then(|v| v.as_str())
        .filter(|t| t.eq_ignore_ascii_case("TELECOMMUTE"))
        .map(|_| true);

    Some(PostingDraft {
        title,
        url: ld_str(map.get("url")),
        company: map
            .get("hiringOrganization")
            .and_then(|org| ld_str(org.get("name")).or_else(|| ld_str(Some(org)))),
        location: ld_location(map.get("jobLocation")),
        description: ld_str(map.get("description")).map(|d| html_to_text(&d)),
        posted_date: ld_str(map.get("datePosted")),
        salary: ld_salary(map.get("baseSalary")),
        employment_type,
        remote,
    })
}

fn ld_location(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .take(3)
                .filter_map(|v| ld_location(Some(v)))
                .collect();
            (!parts.is_empty()).then(|| parts.join(" / "))
        }
        Value::Object(place) => match place.get("address") {
            Some(Value::Object(address)) => {
                let country = address
                    .get("addressCountry")
                    .and_then(|c| ld_str(Some(c)).or_else(|| ld_str(c.get("name"))));
                let parts: Vec<String> = [
                    ld_str(address.get("addressLocality")),
                    ld_str(address.get("addressRegion")),
                    country,
                ]
                .into_iter()
                .flatten()
                .collect();
                (!parts.is_empty()).then(|| parts.join(", "))
            }
            other => ld_str(other).or_else(|| ld_str(place.get("name"))),
        },
        other => ld_str(Some(other)),
    }
}

fn format_amount(value: &Value) -> Option<String> {
    let n = value.as_f64()?;
    Some(if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    })
}

fn ld_salary(value: Option<&Value>) -> Option<String> {
    let salary = value?.as_object()?;
    let currency = ld_str(salary.get("currency")).unwrap_or_default();
    let amount = salary.get("value")?;
    let (range, unit) = match amount {
        Value::Object(q) => {
            let range = match (
                q.get("minValue").and_then(format_amount),
                q.get("maxValue").and_then(format_amount),
                q.get("value").and_then(format_amount),
            ) {
                (Some(min), Some(max), _) => format!("{}-{}", min, max),
                (Some(v), None, _) | (None, Some(v), _) | (None, None, Some(v)) => v,
                _ => return None,
            };
            (range, ld_str(q.get("unitText")))
        }
        other => (format_amount(other)?, None),
    };

    let mut out = format!("{} {}", currency, range).trim().to_string();
    if let Some(unit) = unit {
        out.push_str(&format!(" / {}", unit.to_lowercase()));
    }
    Some(out)
}
