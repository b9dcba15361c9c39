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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// 默认的精选雇主集合（未指定公司时使用）
pub const DEFAULT_COMPANIES: &[&str] = &[
    "stripe", "airbnb", "openai", "netflix", "nvidia", "spotify", "amazon", "figma", "cloudflare",
];

/// 应用程序配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 缓存配置
    pub cache: CacheSettings,
    /// 抓取器配置
    pub scraper: ScraperSettings,
    /// 匹配配置
    pub matching: MatchingSettings,
    /// 搜索配置
    pub search: SearchSettings,
    /// 聚合源配置
    pub aggregators: AggregatorSettings,
    /// 雇主目录配置
    #[serde(default)]
    pub catalog: CatalogSettings,
    /// 职位持久化配置
    #[serde(default)]
    pub storage: StorageSettings,
    /// 日志配置
    pub logging: LoggingSettings,
}

/// 缓存后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// 每个缓存键一个 JSON 文件
    File,
    /// 进程内缓存
    Memory,
}

/// 缓存配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// 缓存目录
    pub dir: PathBuf,
    /// 有效期（小时）
    pub ttl_hours: u64,
    /// 缓存后端
    pub backend: CacheBackend,
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_hours * 3600)
    }
}

/// 抓取器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperSettings {
    /// HTTP 请求超时（秒）
    pub http_timeout_secs: u64,
    /// 浏览器页面加载超时（秒）
    pub page_load_timeout_secs: u64,
    /// 等待元素出现的超时（秒）
    pub element_wait_timeout_secs: u64,
    /// 相邻两次雇主抓取之间的礼貌间隔（毫秒）
    pub courtesy_delay_ms: u64,
    /// 触发懒加载的滚动次数
    pub scroll_rounds: u32,
    /// 标题最小长度
    pub min_title_len: usize,
    /// User-Agent
    pub user_agent: String,
    /// 远程 Chrome 调试地址；设置后连接而不是启动浏览器
    pub chromium_remote_url: Option<String>,
}

/// 匹配配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    /// 多词短语的词覆盖率阈值
    pub word_overlap_threshold: f64,
}

/// 搜索配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    /// 单次请求最多的雇主数
    pub max_companies: usize,
    /// 每个雇主最多保留的职位数
    pub per_employer_limit: usize,
    /// 默认结果上限
    pub default_max_results: usize,
    /// 未指定雇主时使用的精选集合
    pub default_companies: Vec<String>,
}

/// 聚合源配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct AggregatorSettings {
    /// Remotive API 地址
    pub remotive_url: String,
    /// RemoteOK API 地址
    pub remoteok_url: String,
}

/// 雇主目录配置设置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogSettings {
    /// 额外的 YAML 目录文件
    pub extra_file: Option<PathBuf>,
}

/// 职位持久化配置设置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageSettings {
    /// JSON Lines 输出文件；未设置时不持久化
    pub jobs_file: Option<PathBuf>,
}

/// 日志配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// 是否输出 JSON 日志
    pub json: bool,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载内置默认值、`config/default`、`config/{APP_ENVIRONMENT}`，
    /// 最后应用 `JOBHOUND__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("JOBHOUND")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("search.default_companies")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// 只包含内置默认值的配置
    pub fn default_settings() -> Result<Self, ConfigError> {
        Self::defaults()?.build()?.try_deserialize()
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            // Cache
            .set_default("cache.dir", ".cache/jobs")?
            .set_default("cache.ttl_hours", 6)?
            .set_default("cache.backend", "file")?
            // Scraper
            .set_default("scraper.http_timeout_secs", 20)?
            .set_default("scraper.page_load_timeout_secs", 30)?
            .set_default("scraper.element_wait_timeout_secs", 10)?
            .set_default("scraper.courtesy_delay_ms", 1500)?
            .set_default("scraper.scroll_rounds", 4)?
            .set_default("scraper.min_title_len", 4)?
            .set_default(
                "scraper.user_agent",
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
            )?
            // Matching
            .set_default("matching.word_overlap_threshold", 0.7)?
            // Search
            .set_default("search.max_companies", 5)?
            .set_default("search.per_employer_limit", 15)?
            .set_default("search.default_max_results", 50)?
            .set_default(
                "search.default_companies",
                DEFAULT_COMPANIES
                    .iter()
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>(),
            )?
            // Aggregators
            .set_default("aggregators.remotive_url", "https://remotive.com/api/remote-jobs")?
            .set_default("aggregators.remoteok_url", "https://remoteok.com/api")?
            // Logging
            .set_default("logging.json", false)
    }
}
