// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::time::Duration;
use tracing::{debug, info};

use crate::domain::models::{CacheEntry, CacheFingerprint, JobRecord};
use crate::domain::repositories::{CacheError, CacheStats, JobCache};

/// 进程内缓存
///
/// 与文件缓存语义一致，但只在进程生命周期内有效
#[derive(Debug, Default)]
pub struct MemoryJobCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl MemoryJobCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get_at(&self, fingerprint: &CacheFingerprint, now: DateTime<Utc>) -> Option<Vec<JobRecord>> {
        let key = fingerprint.cache_key();
        let entry = self.entries.get(&key)?;

        if !entry.is_fresh_at(now, self.ttl) {
            drop(entry);
            self.entries.remove(&key);
            debug!("Expired memory cache entry {}", key);
            return None;
        }
        if entry.fingerprint != *fingerprint {
            return None;
        }
        Some(entry.jobs.clone())
    }

    pub fn put_at(&self, fingerprint: &CacheFingerprint, jobs: &[JobRecord], now: DateTime<Utc>) {
        let key = fingerprint.cache_key();
        self.entries.insert(
            key,
            CacheEntry::new(fingerprint.clone(), jobs.to_vec(), now),
        );
    }

    pub fn sweep_at(&self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_fresh_at(now, self.ttl));
        before - self.entries.len()
    }

    pub fn stats_at(&self, now: DateTime<Utc>) -> Result<CacheStats, CacheError> {
        let mut stats = CacheStats {
            ttl_hours: self.ttl.as_secs() / 3600,
            ..CacheStats::default()
        };
        for entry in self.entries.iter() {
            stats.entry_count += 1;
            stats.total_size_bytes += serde_json::to_vec(entry.value())?.len() as u64;
            if !entry.is_fresh_at(now, self.ttl) {
                stats.expired_count += 1;
            }
        }
        Ok(stats)
    }
}

#[async_trait]
impl JobCache for MemoryJobCache {
    async fn get(&self, fingerprint: &CacheFingerprint) -> Result<Option<Vec<JobRecord>>, CacheError> {
        Ok(self.get_at(fingerprint, Utc::now()))
    }

    async fn put(&self, fingerprint: &CacheFingerprint, jobs: &[JobRecord]) -> Result<(), CacheError> {
        self.put_at(fingerprint, jobs, Utc::now());
        Ok(())
    }

    async fn sweep(&self) -> Result<usize, CacheError> {
        let removed = self.sweep_at(Utc::now());
        info!("Memory cache sweep removed {} entries", removed);
        Ok(removed)
    }

    async fn clear(&self) -> Result<usize, CacheError> {
        let removed = self.entries.len();
        self.entries.clear();
        info!("Cleared all memory cache entries");
        Ok(removed)
    }

    async fn stats(&self) -> Result<CacheStats, CacheError> {
        self.stats_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::SearchRequest;

    fn fingerprint(title: &str) -> CacheFingerprint {
        CacheFingerprint::new(
            &SearchRequest::new(vec![title.into()], vec!["Remote".into()]),
            &[],
        )
    }

    fn job() -> JobRecord {
        JobRecord::new("Data Engineer", "Figma", "https://figma.com/jobs/9", "greenhouse").unwrap()
    }

    #[tokio::test]
    async fn test_hit_then_expire() {
        let cache = MemoryJobCache::new(Duration::from_secs(60));
        let now = Utc::now();
        cache.put_at(&fingerprint("data"), &[job()], now);

        assert_eq!(cache.get_at(&fingerprint("data"), now), Some(vec![job()]));
        assert!(cache
            .get_at(&fingerprint("data"), now + chrono::Duration::seconds(61))
            .is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_sweep_clear_and_stats() {
        let cache = MemoryJobCache::new(Duration::from_secs(2 * 3600));
        let now = Utc::now();
        cache.put_at(&fingerprint("a"), &[job()], now);
        cache.put_at(&fingerprint("b"), &[job()], now - chrono::Duration::hours(3));

        let stats = cache.stats_at(now).unwrap();
        assert_eq!(stats.entry_count, 2);
        assert_eq!(stats.expired_count, 1);
        assert_eq!(stats.ttl_hours, 2);

        assert_eq!(cache.sweep_at(now), 1);
        assert_eq!(cache.clear().await.unwrap(), 1);
        assert!(cache.get(&fingerprint("a")).await.unwrap().is_none());
    }
}
