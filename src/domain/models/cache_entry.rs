// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::Duration;

use crate::domain::models::job::JobRecord;
use crate::domain::models::search_request::SearchRequest;

/// 参与缓存键计算的请求字段
///
/// 列表字段会被小写、去重并排序，因此属性顺序与元素顺序都不影响键
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheFingerprint {
    pub titles: Vec<String>,
    pub locations: Vec<String>,
    pub remote_only: bool,
    pub max_results: usize,
    pub boards: Vec<String>,
    /// 仅在按雇主缓存时非空
    pub companies: Vec<String>,
}

fn canonical(values: &[String]) -> Vec<String> {
    let mut out: Vec<String> = values
        .iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}

impl CacheFingerprint {
    /// 从请求（以及可选的雇主键集合）构建指纹
    pub fn new(request: &SearchRequest, companies: &[String]) -> Self {
        Self {
            titles: canonical(&request.titles),
            locations: canonical(&request.locations),
            remote_only: request.remote_only,
            max_results: request.max_results,
            boards: canonical(&request.boards),
            companies: canonical(companies),
        }
    }

    /// 内容寻址的缓存键：规范序列化后的 SHA-256 十六进制串
    pub fn cache_key(&self) -> String {
        // 字段顺序由结构体定义固定，序列化结果是确定的
        let canonical = serde_json::to_vec(self).unwrap_or_default();
        hex::encode(Sha256::digest(&canonical))
    }
}

/// 缓存条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub fingerprint: CacheFingerprint,
    /// 创建时间（ISO-8601）
    pub created_at: DateTime<Utc>,
    pub jobs: Vec<JobRecord>,
}

impl CacheEntry {
    pub fn new(fingerprint: CacheFingerprint, jobs: Vec<JobRecord>, created_at: DateTime<Utc>) -> Self {
        Self {
            fingerprint,
            created_at,
            jobs,
        }
    }

    /// `now - created_at < ttl` 时有效
    pub fn is_fresh_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let age = now.signed_duration_since(self.created_at);
        match chrono::Duration::from_std(ttl) {
            Ok(ttl) => age < ttl,
            Err(_) => true,
        }
    }
}
