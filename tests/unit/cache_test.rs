// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::Utc;
use jobhound::domain::models::{CacheFingerprint, JobRecord, SearchRequest};
use jobhound::domain::repositories::JobCache;
use jobhound::infrastructure::cache::FileJobCache;
use std::time::Duration;
use tempfile::TempDir;

const TTL: Duration = Duration::from_secs(6 * 3600);

fn request() -> SearchRequest {
    SearchRequest::new(
        vec!["Data Engineer".into(), "Analytics Engineer".into()],
        vec!["Remote".into(), "London".into()],
    )
}

#[test]
fn test_identical_requests_share_a_key_regardless_of_order() {
    // Given: 字段值相同但 JSON 属性顺序与列表顺序不同的两个请求
    let a: SearchRequest = serde_json::from_str(
        r#"{"titles":["Data Engineer","Analytics Engineer"],"locations":["Remote","London"],"max_results":20}"#,
    )
    .unwrap();
    let b: SearchRequest = serde_json::from_str(
        r#"{"max_results":20,"locations":["london","remote"],"titles":["analytics engineer","data engineer"]}"#,
    )
    .unwrap();

    // Then: 缓存键一致
    assert_eq!(
        CacheFingerprint::new(&a, &[]).cache_key(),
        CacheFingerprint::new(&b, &[]).cache_key()
    );
}

#[tokio::test]
async fn test_entry_is_hit_before_ttl_and_removed_after() {
    let dir = TempDir::new().unwrap();
    let cache = FileJobCache::new(dir.path(), TTL);
    let fingerprint = CacheFingerprint::new(&request(), &[]);
    let job = JobRecord::new("Data Engineer", "Spotify", "https://spotify.example/j/1", "lever")
        .unwrap()
        .with_posted_date(Some("2024-05-01".into()))
        .with_employment_type(Some("Full-time".into()));

    // Given: T 时刻写入
    let written = Utc::now();
    cache.put_at(&fingerprint, &[job.clone()], written).await.unwrap();

    // When: T + TTL - 1s 读取
    let hit = cache
        .get_at(&fingerprint, written + chrono::Duration::seconds(TTL.as_secs() as i64 - 1))
        .await
        .unwrap();
    // Then: 命中，且字段完全一致
    assert_eq!(hit, Some(vec![job]));

    // When: T + TTL + 1s 读取
    let miss = cache
        .get_at(&fingerprint, written + chrono::Duration::seconds(TTL.as_secs() as i64 + 1))
        .await
        .unwrap();
    // Then: 未命中且文件被删除
    assert!(miss.is_none());
    assert_eq!(cache.stats().await.unwrap().entry_count, 0);
}

#[tokio::test]
async fn test_cache_file_layout() {
    let dir = TempDir::new().unwrap();
    let cache = FileJobCache::new(dir.path(), TTL);
    let fingerprint = CacheFingerprint::new(&request(), &["spotify".into()]);
    cache.put(&fingerprint, &[]).await.unwrap();

    let path = dir.path().join(format!("{}.json", fingerprint.cache_key()));
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();

    assert_eq!(value["fingerprint"]["companies"], serde_json::json!(["spotify"]));
    assert!(value["created_at"].as_str().unwrap().contains('T'));
    assert_eq!(value["jobs"], serde_json::json!([]));
}
