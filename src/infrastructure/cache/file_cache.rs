// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::domain::models::{CacheEntry, CacheFingerprint, JobRecord};
use crate::domain::repositories::{CacheError, CacheStats, JobCache};

const ENTRY_EXTENSION: &str = "json";

/// 读取单个缓存文件的结果
enum LoadedEntry {
    Fresh(CacheEntry),
    Stale,
    Corrupt,
}

/// 文件缓存
///
/// 每个缓存键对应目录下的一个 `{key}.json` 文件。
/// 写入先落到临时文件再重命名，相同键的并发写入以最后一次为准。
#[derive(Debug, Clone)]
pub struct FileJobCache {
    dir: PathBuf,
    ttl: Duration,
}

impl FileJobCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", key, ENTRY_EXTENSION))
    }

    async fn load(&self, path: &Path, now: DateTime<Utc>) -> Result<Option<LoadedEntry>, CacheError> {
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let entry: CacheEntry = match serde_json::from_slice(&bytes) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Corrupt cache entry {}: {}", path.display(), e);
                return Ok(Some(LoadedEntry::Corrupt));
            }
        };

        if entry.is_fresh_at(now, self.ttl) {
            Ok(Some(LoadedEntry::Fresh(entry)))
        } else {
            Ok(Some(LoadedEntry::Stale))
        }
    }

    async fn remove_quietly(path: &Path) -> bool {
        match fs::remove_file(path).await {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => {
                warn!("Failed to remove cache file {}: {}", path.display(), e);
                false
            }
        }
    }

    /// 所有缓存文件的路径
    async fn entry_files(&self) -> Result<Vec<PathBuf>, CacheError> {
        let mut files = Vec::new();
        let mut dir = match fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(files),
            Err(e) => return Err(e.into()),
        };

        while let Some(item) = dir.next_entry().await? {
            let path = item.path();
            if path.extension().and_then(|e| e.to_str()) == Some(ENTRY_EXTENSION) {
                files.push(path);
            }
        }
        Ok(files)
    }

    /// 以给定时间点读取缓存
    ///
    /// 过期或损坏的条目会被删除并视为未命中；
    /// 指纹不一致（哈希碰撞）同样视为未命中
    pub async fn get_at(
        &self,
        fingerprint: &CacheFingerprint,
        now: DateTime<Utc>,
    ) -> Result<Option<Vec<JobRecord>>, CacheError> {
        let key = fingerprint.cache_key();
        let path = self.entry_path(&key);

        match self.load(&path, now).await? {
            None => {
                debug!("Cache miss for {}", key);
                Ok(None)
            }
            Some(LoadedEntry::Fresh(entry)) => {
                if entry.fingerprint != *fingerprint {
                    warn!("Cache key {} holds a different fingerprint", key);
                    return Ok(None);
                }
                debug!("Cache hit for {} ({} jobs)", key, entry.jobs.len());
                Ok(Some(entry.jobs))
            }
            Some(LoadedEntry::Stale) | Some(LoadedEntry::Corrupt) => {
                debug!("Dropping unusable cache entry {}", key);
                Self::remove_quietly(&path).await;
                Ok(None)
            }
        }
    }

    /// 以给定时间点写入缓存
    pub async fn put_at(
        &self,
        fingerprint: &CacheFingerprint,
        jobs: &[JobRecord],
        now: DateTime<Utc>,
    ) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir).await?;

        let key = fingerprint.cache_key();
        let entry = CacheEntry::new(fingerprint.clone(), jobs.to_vec(), now);
        let payload = serde_json::to_vec_pretty(&entry)?;

        let path = self.entry_path(&key);
        let tmp = self
            .dir
            .join(format!("{}.{}.tmp", key, rand::random::<u32>()));
        fs::write(&tmp, &payload).await?;
        if let Err(e) = fs::rename(&tmp, &path).await {
            Self::remove_quietly(&tmp).await;
            return Err(e.into());
        }

        debug!("Cached {} jobs under {}", jobs.len(), key);
        Ok(())
    }

    /// 以给定时间点清理过期与损坏的条目
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> Result<usize, CacheError> {
        let mut removed = 0;
        for path in self.entry_files().await? {
            match self.load(&path, now).await? {
                Some(LoadedEntry::Stale) | Some(LoadedEntry::Corrupt) => {
                    if Self::remove_quietly(&path).await {
                        removed += 1;
                    }
                }
                _ => {}
            }
        }
        info!("Cache sweep removed {} entries", removed);
        Ok(removed)
    }

    pub async fn stats_at(&self, now: DateTime<Utc>) -> Result<CacheStats, CacheError> {
        let mut stats = CacheStats {
            ttl_hours: self.ttl.as_secs() / 3600,
            ..CacheStats::default()
        };

        for path in self.entry_files().await? {
            let metadata = match fs::metadata(&path).await {
                Ok(metadata) => metadata,
                Err(_) => continue,
            };
            stats.entry_count += 1;
            stats.total_size_bytes += metadata.len();
            if !matches!(self.load(&path, now).await?, Some(LoadedEntry::Fresh(_))) {
                stats.expired_count += 1;
            }
        }
        Ok(stats)
    }
}

#[async_trait]
impl JobCache for FileJobCache {
    async fn get(&self, fingerprint: &CacheFingerprint) -> Result<Option<Vec<JobRecord>>, CacheError> {
        self.get_at(fingerprint, Utc::now()).await
    }

    async fn put(&self, fingerprint: &CacheFingerprint, jobs: &[JobRecord]) -> Result<(), CacheError> {
        self.put_at(fingerprint, jobs, Utc::now()).await
    }

    async fn sweep(&self) -> Result<usize, CacheError> {
        self.sweep_at(Utc::now()).await
    }

    async fn clear(&self) -> Result<usize, CacheError> {
        let mut removed = 0;
        for path in self.entry_files().await? {
            if Self::remove_quietly(&path).await {
                removed += 1;
            }
        }
        info!("Cleared {} cache entries from {}", removed, self.dir.display());
        Ok(removed)
    }

    async fn stats(&self) -> Result<CacheStats, CacheError> {
        self.stats_at(Utc::now()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::SearchRequest;
    use tempfile::TempDir;

    const TTL: Duration = Duration::from_secs(6 * 3600);

    fn fingerprint() -> CacheFingerprint {
        let request = SearchRequest::new(vec!["QA Engineer".into()], vec!["Remote".into()]);
        CacheFingerprint::new(&request, &["stripe".into()])
    }

    fn jobs() -> Vec<JobRecord> {
        vec![
            JobRecord::new("SDET II", "Stripe", "https://stripe.com/jobs/1", "greenhouse")
                .unwrap()
                .with_location("Remote - US")
                .with_salary(Some("$150k".into()))
                .with_remote(Some(true))
                .with_description("Build test infrastructure"),
            JobRecord::new("QA Lead", "Stripe", "https://stripe.com/jobs/2", "greenhouse").unwrap(),
        ]
    }

    #[tokio::test]
    async fn test_round_trip_is_field_for_field() {
        let dir = TempDir::new().unwrap();
        let cache = FileJobCache::new(dir.path(), TTL);

        cache.put(&fingerprint(), &jobs()).await.unwrap();
        let loaded = cache.get(&fingerprint()).await.unwrap();
        assert_eq!(loaded, Some(jobs()));
    }

    #[tokio::test]
    async fn test_ttl_boundary() {
        let dir = TempDir::new().unwrap();
        let cache = FileJobCache::new(dir.path(), TTL);
        let written = Utc::now();
        cache.put_at(&fingerprint(), &jobs(), written).await.unwrap();

        let just_before = written + chrono::Duration::seconds(TTL.as_secs() as i64 - 1);
        assert!(cache.get_at(&fingerprint(), just_before).await.unwrap().is_some());

        let just_after = written + chrono::Duration::seconds(TTL.as_secs() as i64 + 1);
        assert!(cache.get_at(&fingerprint(), just_after).await.unwrap().is_none());

        let path = cache.entry_path(&fingerprint().cache_key());
        assert!(!path.exists(), "stale entry should be removed on read");
    }

    #[tokio::test]
    async fn test_corrupt_file_is_a_miss_and_removed() {
        let dir = TempDir::new().unwrap();
        let cache = FileJobCache::new(dir.path(), TTL);
        let path = cache.entry_path(&fingerprint().cache_key());
        std::fs::write(&path, b"{not json").unwrap();

        assert!(cache.get(&fingerprint()).await.unwrap().is_none());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let cache = FileJobCache::new(dir.path().join("absent"), TTL);

        assert!(cache.get(&fingerprint()).await.unwrap().is_none());
        assert_eq!(cache.sweep().await.unwrap(), 0);
        assert_eq!(cache.stats().await.unwrap().entry_count, 0);
    }

    #[tokio::test]
    async fn test_sweep_and_stats() {
        let dir = TempDir::new().unwrap();
        let cache = FileJobCache::new(dir.path(), TTL);
        let now = Utc::now();
        let old = now - chrono::Duration::hours(7);

        let fresh = fingerprint();
        let stale = CacheFingerprint::new(
            &SearchRequest::new(vec!["Designer".into()], vec!["Berlin".into()]),
            &[],
        );
        cache.put_at(&fresh, &jobs(), now).await.unwrap();
        cache.put_at(&stale, &jobs(), old).await.unwrap();

        let stats = cache.stats_at(now).await.unwrap();
        assert_eq!(stats.entry_count, 2);
        assert_eq!(stats.expired_count, 1);
        assert_eq!(stats.ttl_hours, 6);
        assert!(stats.total_size_bytes > 0);

        assert_eq!(cache.sweep_at(now).await.unwrap(), 1);
        assert!(cache.get_at(&fresh, now).await.unwrap().is_some());
        assert_eq!(cache.clear().await.unwrap(), 1);
        assert_eq!(cache.stats_at(now).await.unwrap().entry_count, 0);
    }
}
