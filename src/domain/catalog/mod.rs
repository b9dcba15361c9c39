// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 雇主目录
//!
//! 雇主键到抓取目标（URL、策略类型、分类标签）的静态映射。
//! 进程启动时加载一次，之后只读。

mod builtin;

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// 目录加载错误
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid catalog YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid catalog entry `{0}`: {1}")]
    InvalidEntry(String, &'static str),
}

/// 抓取策略家族
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyFamily {
    /// 服务端渲染，直接 HTTP 获取
    Http,
    /// 客户端渲染，需要无头浏览器
    Browser,
}

/// 抓取策略类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Greenhouse,
    Lever,
    Ashby,
    SmartRecruiters,
    AmazonJobs,
    HtmlListing,
    Workday,
    BrowserCareers,
}

impl StrategyKind {
    pub fn family(&self) -> StrategyFamily {
        match self {
            StrategyKind::Workday | StrategyKind::BrowserCareers => StrategyFamily::Browser,
            _ => StrategyFamily::Http,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Greenhouse => "greenhouse",
            StrategyKind::Lever => "lever",
            StrategyKind::Ashby => "ashby",
            StrategyKind::SmartRecruiters => "smart_recruiters",
            StrategyKind::AmazonJobs => "amazon_jobs",
            StrategyKind::HtmlListing => "html_listing",
            StrategyKind::Workday => "workday",
            StrategyKind::BrowserCareers => "browser_careers",
        }
    }
}

/// 目录条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// 雇主键（小写）
    pub key: String,
    /// 展示名称
    pub name: String,
    /// 抓取目标 URL
    pub url: String,
    /// 策略类型
    pub kind: StrategyKind,
    /// 聚合源中可能出现的其他名称
    #[serde(default)]
    pub aliases: Vec<String>,
    /// 分类标签
    #[serde(default)]
    pub categories: Vec<String>,
}

impl CatalogEntry {
    pub fn new(key: &str, name: &str, url: &str, kind: StrategyKind) -> Self {
        Self {
            key: key.to_lowercase(),
            name: name.to_string(),
            url: url.to_string(),
            kind,
            aliases: Vec::new(),
            categories: Vec::new(),
        }
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_categories(mut self, categories: &[&str]) -> Self {
        self.categories = categories.iter().map(|s| s.to_string()).collect();
        self
    }

    /// 展示名称与所有别名（小写）
    pub fn name_variants(&self) -> Vec<String> {
        let mut variants = vec![self.name.to_lowercase(), self.key.clone()];
        variants.extend(self.aliases.iter().map(|a| a.to_lowercase()));
        variants.dedup();
        variants
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.key.trim().is_empty() {
            return Err(CatalogError::InvalidEntry(self.name.clone(), "empty key"));
        }
        if self.name.trim().is_empty() {
            return Err(CatalogError::InvalidEntry(self.key.clone(), "empty name"));
        }
        if !crate::utils::url_utils::is_http_url(&self.url) {
            return Err(CatalogError::InvalidEntry(self.key.clone(), "url is not http(s)"));
        }
        Ok(())
    }
}

/// 雇主目录
#[derive(Debug, Clone, Default)]
pub struct SourceCatalog {
    entries: Vec<CatalogEntry>,
}

impl SourceCatalog {
    /// 以给定条目构建目录；键重复时后出现的条目覆盖之前的条目
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let mut catalog = Self::default();
        catalog.merge(entries);
        catalog
    }

    /// 内置目录
    pub fn builtin() -> Self {
        Self::new(builtin::entries())
    }

    /// 从 YAML 文本解析条目列表
    pub fn parse_yaml(content: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
        let mut entries: Vec<CatalogEntry> = serde_yaml::from_str(content)?;
        for entry in &mut entries {
            entry.key = entry.key.trim().to_lowercase();
            entry.validate()?;
        }
        Ok(entries)
    }

    /// 合并 YAML 文件中的额外条目
    pub fn with_yaml_file(mut self, path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        let entries = Self::parse_yaml(&content)?;
        tracing::info!(
            "Loaded {} extra catalog entries from {}",
            entries.len(),
            path.display()
        );
        self.merge(entries);
        Ok(self)
    }

    fn merge(&mut self, entries: Vec<CatalogEntry>) {
        for entry in entries {
            match self.entries.iter_mut().find(|e| e.key == entry.key) {
                Some(existing) => *existing = entry,
                None => self.entries.push(entry),
            }
        }
    }

    /// 按雇主键查找（不区分大小写）
    pub fn get(&self, key: &str) -> Option<&CatalogEntry> {
        let key = key.trim().to_lowercase();
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 带有某个分类标签的条目
    pub fn by_category(&self, tag: &str) -> Vec<&CatalogEntry> {
        self.entries
            .iter()
            .filter(|e| e.categories.iter().any(|c| c.eq_ignore_ascii_case(tag)))
            .collect()
    }

    /// 精选默认集合中在目录里存在的雇主键（保持顺序）
    pub fn curated_defaults(&self, configured: &[String]) -> Vec<String> {
        configured
            .iter()
            .filter_map(|k| self.get(k).map(|e| e.key.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::DEFAULT_COMPANIES;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = SourceCatalog::builtin();
        assert!(catalog.len() >= 20);
        for entry in catalog.entries() {
            entry.validate().unwrap();
            assert_eq!(entry.key, entry.key.to_lowercase());
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let catalog = SourceCatalog::builtin();
        let entry = catalog.get("  Stripe ").unwrap();
        assert_eq!(entry.kind, StrategyKind::Greenhouse);
        assert!(catalog.get("does-not-exist").is_none());
    }

    #[test]
    fn test_curated_defaults_all_resolve_and_span_categories() {
        let catalog = SourceCatalog::builtin();
        let configured: Vec<String> = DEFAULT_COMPANIES.iter().map(|s| s.to_string()).collect();
        let defaults = catalog.curated_defaults(&configured);
        assert_eq!(defaults.len(), configured.len());

        let mut tags: Vec<&str> = defaults
            .iter()
            .filter_map(|k| catalog.get(k))
            .flat_map(|e| e.categories.iter().map(String::as_str))
            .collect();
        tags.sort();
        tags.dedup();
        assert!(tags.len() >= 5, "default set should be diverse: {:?}", tags);
    }

    #[test]
    fn test_yaml_entries_override_builtin() {
        let yaml = r#"
- key: Stripe
  name: Stripe Inc
  url: https://stripe.com/jobs/search
  kind: html_listing
- key: acme
  name: Acme
  url: https://acme.example/careers
  kind: browser_careers
  aliases: [Acme Corp]
  categories: [startup]
"#;
        let mut catalog = SourceCatalog::builtin();
        let before = catalog.len();
        catalog.merge(SourceCatalog::parse_yaml(yaml).unwrap());

        assert_eq!(catalog.len(), before + 1);
        assert_eq!(catalog.get("stripe").unwrap().kind, StrategyKind::HtmlListing);
        let acme = catalog.get("acme").unwrap();
        assert!(acme.name_variants().contains(&"acme corp".to_string()));
        assert_eq!(catalog.by_category("startup").len(), 1);
    }

    #[test]
    fn test_yaml_rejects_non_http_urls() {
        let yaml = "- {key: bad, name: Bad, url: 'ftp://x', kind: lever}";
        assert!(matches!(
            SourceCatalog::parse_yaml(yaml),
            Err(CatalogError::InvalidEntry(_, _))
        ));
    }

    #[test]
    fn test_strategy_families() {
        assert_eq!(StrategyKind::Workday.family(), StrategyFamily::Browser);
        assert_eq!(StrategyKind::BrowserCareers.family(), StrategyFamily::Browser);
        assert_eq!(StrategyKind::Greenhouse.family(), StrategyFamily::Http);
        assert_eq!(StrategyKind::HtmlListing.family(), StrategyFamily::Http);
    }
}
