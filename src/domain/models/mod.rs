// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 职位记录（job）：标准化后的单个职位
/// - 搜索请求（search_request）：经过校验的搜索参数
/// - 缓存条目（cache_entry）：内容寻址的缓存指纹与负载
pub mod cache_entry;
pub mod job;
pub mod search_request;

pub use cache_entry::{CacheEntry, CacheFingerprint};
pub use job::{JobRecord, JobRecordError};
pub use search_request::SearchRequest;
