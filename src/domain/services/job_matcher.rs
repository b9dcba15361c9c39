// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashSet;

use crate::domain::models::{JobRecord, SearchRequest};

/// 远程职位标记；请求地点为 "remote" 时任一标记都算匹配
pub const REMOTE_MARKERS: &[&str] = &["remote", "distributed", "anywhere"];

/// 多词短语的默认词覆盖率阈值
pub const DEFAULT_WORD_OVERLAP: f64 = 0.7;

const STOPWORDS: &[&str] = &["of", "and", "the", "a", "an", "in", "for", "to", "at", "with"];

const DEFAULT_SYNONYMS: &[&[&str]] = &[
    &[
        "qa engineer",
        "quality assurance",
        "test engineer",
        "sdet",
        "qa automation",
        "software engineer in test",
        "quality engineer",
    ],
    &[
        "software engineer",
        "software developer",
        "developer",
        "programmer",
        "swe",
    ],
    &[
        "frontend engineer",
        "front end engineer",
        "frontend developer",
        "ui engineer",
    ],
    &[
        "backend engineer",
        "back end engineer",
        "backend developer",
        "server engineer",
    ],
    &[
        "full stack engineer",
        "fullstack engineer",
        "full stack developer",
    ],
    &[
        "devops engineer",
        "site reliability engineer",
        "sre",
        "platform engineer",
        "infrastructure engineer",
    ],
    &[
        "data scientist",
        "machine learning engineer",
        "ml engineer",
        "applied scientist",
    ],
    &["data engineer", "analytics engineer", "etl developer"],
    &["product manager", "product owner", "technical program manager"],
    &["product designer", "ux designer", "ui designer", "interaction designer"],
    &["mobile engineer", "ios engineer", "android engineer", "mobile developer"],
    &["security engineer", "application security", "appsec", "security analyst"],
];

/// 小写分词；`+` 与 `#` 视为单词字符（c++、c#）
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn content_words(phrase: &str) -> Vec<String> {
    let tokens = tokenize(phrase);
    let content: Vec<String> = tokens
        .iter()
        .filter(|t| !STOPWORDS.contains(&t.as_str()))
        .cloned()
        .collect();
    if content.is_empty() {
        tokens
    } else {
        content
    }
}

/// 匹配引擎
///
/// 纯函数式过滤：标题短语经同义词扩展后按词覆盖率匹配合并文本，
/// 地点按字面或远程标记匹配。
#[derive(Debug, Clone)]
pub struct JobMatcher {
    threshold: f64,
    synonyms: Vec<Vec<Vec<String>>>,
}

impl Default for JobMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_WORD_OVERLAP)
    }
}

impl JobMatcher {
    pub fn new(threshold: f64) -> Self {
        let synonyms = DEFAULT_SYNONYMS
            .iter()
            .map(|group| group.iter().map(|p| content_words(p)).collect())
            .collect();
        Self {
            threshold: threshold.clamp(0.0, 1.0),
            synonyms,
        }
    }

    /// 追加一个同义词组
    pub fn with_synonym_group(mut self, group: &[&str]) -> Self {
        self.synonyms
            .push(group.iter().map(|p| content_words(p)).collect());
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// 职位是否满足请求
    pub fn matches(&self, job: &JobRecord, request: &SearchRequest) -> bool {
        if !self.title_matches(job, &request.titles) {
            return false;
        }
        if request.remote_only {
            // 只要远程时，远程标记本身即满足地点条件
            return Self::is_remote(job);
        }
        self.location_matches(job, &request.locations)
    }

    /// 过滤并保持原有顺序
    pub fn filter(&self, jobs: Vec<JobRecord>, request: &SearchRequest) -> Vec<JobRecord> {
        jobs.into_iter()
            .filter(|job| self.matches(job, request))
            .collect()
    }

    /// 任一查询短语（或其同义词）命中职位合并文本即为匹配
    pub fn title_matches(&self, job: &JobRecord, titles: &[String]) -> bool {
        let text: HashSet<String> = tokenize(&job.combined_text()).into_iter().collect();
        titles
            .iter()
            .any(|title| self.expand(title).iter().any(|p| self.phrase_matches(p, &text)))
    }

    /// 查询短语本身加上所有适用同义词组中的短语
    fn expand(&self, phrase: &str) -> Vec<Vec<String>> {
        let words = content_words(phrase);
        let mut expanded = vec![words.clone()];
        for group in &self.synonyms {
            let applies = group
                .iter()
                .any(|member| !member.is_empty() && member.iter().all(|w| words.contains(w)));
            if applies {
                expanded.extend(group.iter().cloned());
            }
        }
        expanded
    }

    fn phrase_matches(&self, words: &[String], text: &HashSet<String>) -> bool {
        match words.len() {
            0 => false,
            1 => text.contains(&words[0]),
            n => {
                let present = words.iter().filter(|w| text.contains(*w)).count();
                present as f64 / n as f64 >= self.threshold
            }
        }
    }

    /// 地点匹配；职位地点未知时不排除
    pub fn location_matches(&self, job: &JobRecord, locations: &[String]) -> bool {
        if locations.is_empty() {
            return true;
        }
        let location = job.location().to_lowercase();

        locations.iter().any(|wanted| {
            let wanted = wanted.trim().to_lowercase();
            if wanted.is_empty() || wanted == "any" || wanted == "worldwide" {
                return true;
            }
            if REMOTE_MARKERS.iter().any(|m| wanted.contains(m)) {
                return Self::is_remote(job);
            }
            if location.is_empty() {
                return true;
            }
            if location.contains(&wanted) {
                return true;
            }
            // "San Francisco, CA" -> "san francisco"
            match wanted.split(',').next().map(str::trim) {
                Some(city) if city.len() >= 3 => location.contains(city),
                _ => false,
            }
        })
    }

    /// 是否带有远程标记
    pub fn is_remote(job: &JobRecord) -> bool {
        if job.remote() == Some(true) {
            return true;
        }
        let location = job.location().to_lowercase();
        let title = job.title().to_lowercase();
        REMOTE_MARKERS
            .iter()
            .any(|m| location.contains(m) || title.contains(m))
    }
}
