// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// 单次请求允许的最大雇主数
pub const MAX_COMPANIES: usize = 5;

fn default_max_results() -> usize {
    50
}

#[allow(clippy::ptr_arg)]
fn no_blank_entries(values: &Vec<String>) -> Result<(), ValidationError> {
    if values.iter().any(|v| v.trim().is_empty()) {
        return Err(ValidationError::new("blank_entry"));
    }
    Ok(())
}

/// 职位搜索请求
///
/// 由上游 API 层校验后传入：标题与地点非空且有序，雇主键不超过 5 个
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SearchRequest {
    /// 职位名称短语（有序）
    #[validate(
        length(min = 1, message = "At least one title is required"),
        custom(function = "no_blank_entries")
    )]
    pub titles: Vec<String>,
    /// 地点（有序）
    #[validate(
        length(min = 1, message = "At least one location is required"),
        custom(function = "no_blank_entries")
    )]
    pub locations: Vec<String>,
    /// 目标雇主键
    #[serde(default)]
    #[validate(length(max = 5, message = "At most 5 companies per request"))]
    pub companies: Vec<String>,
    /// 最大结果数
    #[serde(default = "default_max_results")]
    #[validate(range(min = 1, max = 500))]
    pub max_results: usize,
    /// 只要远程职位
    #[serde(default)]
    pub remote_only: bool,
    /// 指定的聚合源标识
    #[serde(default)]
    pub boards: Vec<String>,
}

impl SearchRequest {
    pub fn new(titles: Vec<String>, locations: Vec<String>) -> Self {
        Self {
            titles,
            locations,
            companies: Vec::new(),
            max_results: default_max_results(),
            remote_only: false,
            boards: Vec::new(),
        }
    }

    pub fn with_companies(mut self, companies: Vec<String>) -> Self {
        self.companies = companies;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_remote_only(mut self, remote_only: bool) -> Self {
        self.remote_only = remote_only;
        self
    }

    pub fn with_boards(mut self, boards: Vec<String>) -> Self {
        self.boards = boards;
        self
    }

    /// 是否指定了雇主
    pub fn is_company_scoped(&self) -> bool {
        self.companies.iter().any(|c| !c.trim().is_empty())
    }

    /// 第一个标题，作为聚合源的查询词
    pub fn primary_title(&self) -> &str {
        self.titles.first().map(String::as_str).unwrap_or("")
    }

    /// 规范化雇主键：小写、去空白、去重（保持顺序），并只保留前 `limit` 个
    pub fn normalize_companies(companies: &[String], limit: usize) -> Vec<String> {
        let mut seen = Vec::new();
        for key in companies {
            let key = key.trim().to_lowercase();
            if key.is_empty() || seen.contains(&key) {
                continue;
            }
            seen.push(key);
            if seen.len() == limit {
                break;
            }
        }
        seen
    }
}
