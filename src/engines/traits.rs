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

use thiserror::Error;

use crate::domain::scraping::ScrapeError;

/// 引擎错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 非 2xx 响应
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },
    /// 超时
    #[error("Timeout")]
    Timeout,
    /// 浏览器错误
    #[error("Browser error: {0}")]
    Browser(String),
}

impl EngineError {
    /// 判断是否为超时类错误
    pub fn is_timeout(&self) -> bool {
        match self {
            EngineError::Timeout => true,
            EngineError::RequestFailed(e) => e.is_timeout(),
            _ => false,
        }
    }
}

impl From<EngineError> for ScrapeError {
    fn from(err: EngineError) -> Self {
        if err.is_timeout() {
            return ScrapeError::Timeout;
        }
        match err {
            EngineError::RequestFailed(e) if e.is_decode() => ScrapeError::Parse(e.to_string()),
            other => ScrapeError::Engine(other.to_string()),
        }
    }
}

impl From<chromiumoxide::error::CdpError> for EngineError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        EngineError::Browser(err.to_string())
    }
}
