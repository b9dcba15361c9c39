// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 缓存模块
///
/// 提供搜索结果缓存的文件与内存实现
pub mod file_cache;
pub mod memory_cache;

pub use file_cache::FileJobCache;
pub use memory_cache::MemoryJobCache;

use std::sync::Arc;

use crate::config::settings::{CacheBackend, CacheSettings};
use crate::domain::repositories::JobCache;

/// 根据配置创建缓存实现
pub fn build_cache(settings: &CacheSettings) -> Arc<dyn JobCache> {
    match settings.backend {
        CacheBackend::File => Arc::new(FileJobCache::new(settings.dir.clone(), settings.ttl())),
        CacheBackend::Memory => Arc::new(MemoryJobCache::new(settings.ttl())),
    }
}
