// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::models::{JobRecord, SearchRequest};
use crate::domain::repositories::JobStore;
use crate::utils::errors::RepositoryError;

/// JSON Lines 文件中的一行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredJob {
    pub stored_at: DateTime<Utc>,
    /// 产生该职位的查询标题
    pub titles: Vec<String>,
    pub job: JobRecord,
}

/// 职位存储实现
///
/// 每个职位追加为一行 JSON，写入在进程内串行化
pub struct JsonLinesJobStore {
    /// 输出文件
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLinesJobStore {
    /// 创建新的职位存储实例
    ///
    /// # 参数
    ///
    /// * `path` - JSON Lines 文件路径，不存在时自动创建
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取全部已存储的职位
    pub async fn load_all(&self) -> Result<Vec<StoredJob>, RepositoryError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(RepositoryError::from))
            .collect()
    }
}

#[async_trait]
impl JobStore for JsonLinesJobStore {
    async fn store(&self, jobs: &[JobRecord], request: &SearchRequest) -> Result<(), RepositoryError> {
        if jobs.is_empty() {
            return Ok(());
        }

        let stored_at = Utc::now();
        let mut buffer = Vec::new();
        for job in jobs {
            let line = StoredJob {
                stored_at,
                titles: request.titles.clone(),
                job: job.clone(),
            };
            serde_json::to_writer(&mut buffer, &line)?;
            buffer.push(b'\n');
        }

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&buffer).await?;
        file.flush().await?;

        debug!("Stored {} jobs to {}", jobs.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_store_appends_lines() {
        let dir = TempDir::new().unwrap();
        let store = JsonLinesJobStore::new(dir.path().join("nested").join("jobs.jsonl"));
        let request = SearchRequest::new(vec!["Rust Engineer".into()], vec!["Remote".into()]);
        let job = JobRecord::new("Rust Engineer", "Cloudflare", "https://cf.com/j/1", "greenhouse")
            .unwrap();

        store.store(&[job.clone()], &request).await.unwrap();
        store.store(&[job.clone(), job.clone()], &request).await.unwrap();
        store.store(&[], &request).await.unwrap();

        let stored = store.load_all().await.unwrap();
        assert_eq!(stored.len(), 3);
        assert_eq!(stored[0].job, job);
        assert_eq!(stored[0].titles, vec!["Rust Engineer".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonLinesJobStore::new(dir.path().join("none.jsonl"));
        assert!(store.load_all().await.unwrap().is_empty());
    }
}
