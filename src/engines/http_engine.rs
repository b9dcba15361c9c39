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

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::settings::ScraperSettings;
use crate::engines::traits::EngineError;

/// HTTP 引擎配置
#[derive(Debug, Clone)]
pub struct HttpEngineConfig {
    /// 超时时间
    pub timeout: Duration,
    /// User-Agent
    pub user_agent: String,
}

impl Default for HttpEngineConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            user_agent: "Mozilla/5.0 (compatible; jobhound/0.1)".to_string(),
        }
    }
}

impl From<&ScraperSettings> for HttpEngineConfig {
    fn from(settings: &ScraperSettings) -> Self {
        Self {
            timeout: Duration::from_secs(settings.http_timeout_secs),
            user_agent: settings.user_agent.clone(),
        }
    }
}

/// HTTP 抓取引擎
///
/// 基于reqwest实现，用于服务端渲染页面与 JSON 接口
#[derive(Debug, Clone, Default)]
pub struct HttpEngine {
    config: HttpEngineConfig,
}

impl HttpEngine {
    pub fn new(config: HttpEngineConfig) -> Self {
        Self { config }
    }

    // Each request gets a fresh client for cookie isolation
    fn client(&self) -> Result<reqwest::Client, EngineError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/json;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        Ok(reqwest::Client::builder()
            .user_agent(self.config.user_agent.as_str())
            .default_headers(headers)
            .timeout(self.config.timeout)
            .cookie_store(true)
            .build()?)
    }

    async fn send(&self, request: reqwest::RequestBuilder, url: &str) -> Result<reqwest::Response, EngineError> {
        let start = Instant::now();
        let response = request.send().await?;
        let status = response.status();
        debug!(
            "GET {} -> {} in {:?}",
            url,
            status.as_u16(),
            start.elapsed()
        );
        if !status.is_success() {
            return Err(EngineError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }

    /// 获取页面文本
    pub async fn get_text(&self, url: &str) -> Result<String, EngineError> {
        let client = self.client()?;
        let response = self.send(client.get(url), url).await?;
        Ok(response.text().await?)
    }

    /// 获取并反序列化 JSON
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, EngineError> {
        let client = self.client()?;
        let response = self.send(client.get(url), url).await?;
        Ok(response.json::<T>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_get_text_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/careers"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let engine = HttpEngine::default();
        let body = engine
            .get_text(&format!("{}/careers", server.uri()))
            .await
            .unwrap();
        assert!(body.contains("ok"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let engine = HttpEngine::default();
        let err = engine.get_text(&server.uri()).await.unwrap_err();
        assert!(matches!(err, EngineError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_timeout_maps_to_scrape_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let engine = HttpEngine::new(HttpEngineConfig {
            timeout: Duration::from_millis(50),
            ..Default::default()
        });
        let err = engine.get_text(&server.uri()).await.unwrap_err();
        assert!(err.is_timeout());
        assert!(matches!(
            crate::domain::scraping::ScrapeError::from(err),
            crate::domain::scraping::ScrapeError::Timeout
        ));
    }
}
