// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::settings::ScraperSettings;
use crate::engines::traits::EngineError;

const POLL_INTERVAL: Duration = Duration::from_millis(250);
const SCROLL_SETTLE_TIMEOUT: Duration = Duration::from_secs(2);

// Walks same-origin frames recursively; cross-origin frames only expose their src
const FRAME_WALK_SCRIPT: &str = r#"(() => {
  const out = [];
  const walk = (doc, depth) => {
    if (depth > 3) return;
    for (const f of doc.querySelectorAll('iframe, frame')) {
      let html = null;
      try {
        if (f.contentDocument && f.contentDocument.documentElement) {
          html = f.contentDocument.documentElement.outerHTML;
          walk(f.contentDocument, depth + 1);
        }
      } catch (e) { html = null; }
      out.push({ src: f.src || '', html: html });
    }
  };
  walk(document, 0);
  return out;
})()"#;

/// 浏览器引擎配置
#[derive(Debug, Clone)]
pub struct BrowserEngineConfig {
    /// 页面加载超时
    pub page_load_timeout: Duration,
    /// 元素等待超时
    pub element_wait_timeout: Duration,
    /// 滚动轮数
    pub scroll_rounds: u32,
    pub user_agent: String,
    /// 远程 Chrome 调试地址，未设置时本地启动
    pub remote_url: Option<String>,
}

impl Default for BrowserEngineConfig {
    fn default() -> Self {
        Self {
            page_load_timeout: Duration::from_secs(30),
            element_wait_timeout: Duration::from_secs(10),
            scroll_rounds: 4,
            user_agent: "Mozilla/5.0 (compatible; jobhound/0.1)".to_string(),
            remote_url: None,
        }
    }
}

impl From<&ScraperSettings> for BrowserEngineConfig {
    fn from(settings: &ScraperSettings) -> Self {
        Self {
            page_load_timeout: Duration::from_secs(settings.page_load_timeout_secs),
            element_wait_timeout: Duration::from_secs(settings.element_wait_timeout_secs),
            scroll_rounds: settings.scroll_rounds,
            user_agent: settings.user_agent.clone(),
            remote_url: settings.chromium_remote_url.clone(),
        }
    }
}

/// 子文档（iframe）内容
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FrameDocument {
    pub src: String,
    /// 跨域 frame 为 None
    pub html: Option<String>,
}

/// 渲染后页面快照
#[derive(Debug, Clone, Default)]
pub struct PageSnapshot {
    pub url: String,
    pub html: String,
    pub body_text: String,
    pub frames: Vec<FrameDocument>,
}

impl PageSnapshot {
    /// 跨域 frame 的地址
    pub fn cross_origin_frames(&self) -> Vec<&str> {
        self.frames
            .iter()
            .filter(|f| f.html.is_none() && f.src.starts_with("http"))
            .map(|f| f.src.as_str())
            .collect()
    }
}

/// 浏览器引擎
///
/// 基于chromiumoxide实现。会话按调用获取，调用结束后释放
#[derive(Debug, Clone, Default)]
pub struct BrowserEngine {
    config: BrowserEngineConfig,
}

impl BrowserEngine {
    pub fn new(config: BrowserEngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BrowserEngineConfig {
        &self.config
    }

    /// 打开一个新的浏览器会话
    ///
    /// 配置了远程地址时连接远程实例，否则启动本地 Chrome
    pub async fn open_session(&self) -> Result<BrowserSession, EngineError> {
        let (browser, mut handler) = if let Some(ref url) = self.config.remote_url {
            info!("Connecting to remote Chrome instance at: {}", url);
            Browser::connect(url)
                .await
                .map_err(|e| EngineError::Browser(format!("Failed to connect to remote Chrome: {}", e)))?
        } else {
            let config = BrowserConfig::builder()
                .no_sandbox()
                .request_timeout(self.config.page_load_timeout)
                .arg("--disable-gpu")
                .arg("--disable-dev-shm-usage")
                .build()
                .map_err(EngineError::Browser)?;
            Browser::launch(config).await?
        };

        let handler = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler.abort();
                return Err(e.into());
            }
        };
        if let Err(e) = page.set_user_agent(self.config.user_agent.as_str()).await {
            debug!("Failed to set user agent: {}", e);
        }

        Ok(BrowserSession {
            browser,
            page,
            handler,
            owns_browser: self.config.remote_url.is_none(),
            config: self.config.clone(),
        })
    }
}

/// 浏览器会话
///
/// 必须调用 `close` 释放；drop 时仅终止事件处理任务
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    owns_browser: bool,
    config: BrowserEngineConfig,
}

impl BrowserSession {
    pub fn config(&self) -> &BrowserEngineConfig {
        &self.config
    }

    /// 导航到指定地址，受页面加载超时约束
    pub async fn goto(&self, url: &str) -> Result<(), EngineError> {
        match tokio::time::timeout(self.config.page_load_timeout, self.page.goto(url)).await {
            Ok(result) => {
                result?;
                Ok(())
            }
            Err(_) => Err(EngineError::Timeout),
        }
    }

    /// 等待任一选择器出现，返回首个命中的选择器
    pub async fn wait_for_any(&self, selectors: &[&str], timeout: Duration) -> Option<String> {
        let deadline = Instant::now() + timeout;
        loop {
            for selector in selectors {
                if self.page.find_element(*selector).await.is_ok() {
                    return Some(selector.to_string());
                }
            }
            if Instant::now() >= deadline {
                return None;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// 点击元素（若存在）
    pub async fn click_if_present(&self, selector: &str) -> bool {
        match self.page.find_element(selector).await {
            Ok(element) => element.click().await.is_ok(),
            Err(_) => false,
        }
    }

    /// 读取首个匹配元素的 innerText
    pub async fn inner_text(&self, selector: &str) -> Option<String> {
        let literal = serde_json::to_string(selector).ok()?;
        let script = format!(
            "(() => {{ const el = document.querySelector({}); return el ? el.innerText : null; }})()",
            literal
        );
        self.page
            .evaluate(script)
            .await
            .ok()?
            .into_value::<Option<String>>()
            .ok()
            .flatten()
    }

    /// 等待元素文本变化（分页后的新结果）
    pub async fn wait_for_text_change(&self, selector: &str, previous: &str, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            match self.inner_text(selector).await {
                Some(text) if text != previous => return true,
                _ => tokio::time::sleep(POLL_INTERVAL).await,
            }
        }
        false
    }

    async fn scroll_height(&self) -> i64 {
        match self
            .page
            .evaluate("document.body ? document.body.scrollHeight : 0")
            .await
        {
            Ok(result) => result.into_value::<i64>().unwrap_or(0),
            Err(_) => 0,
        }
    }

    /// 滚动到底部以触发懒加载，高度不再增长时提前结束
    pub async fn scroll_to_bottom(&self, rounds: u32) {
        for round in 0..rounds {
            let before = self.scroll_height().await;
            if let Err(e) = self
                .page
                .evaluate("window.scrollTo(0, document.body ? document.body.scrollHeight : 0)")
                .await
            {
                debug!("Scroll failed: {}", e);
                return;
            }

            let deadline = Instant::now() + SCROLL_SETTLE_TIMEOUT;
            let mut grew = false;
            while Instant::now() < deadline {
                tokio::time::sleep(POLL_INTERVAL).await;
                if self.scroll_height().await > before {
                    grew = true;
                    break;
                }
            }
            if !grew {
                debug!("Page height settled after {} scroll rounds", round + 1);
                return;
            }
        }
    }

    pub async fn content(&self) -> Result<String, EngineError> {
        Ok(self.page.content().await?)
    }

    pub async fn body_text(&self) -> Result<String, EngineError> {
        let result = self
            .page
            .evaluate("document.body ? document.body.innerText : ''")
            .await?;
        result
            .into_value::<String>()
            .map_err(|e| EngineError::Browser(format!("Unexpected body text: {}", e)))
    }

    /// 收集所有子文档
    pub async fn frames(&self) -> Vec<FrameDocument> {
        match self.page.evaluate(FRAME_WALK_SCRIPT).await {
            Ok(result) => result.into_value::<Vec<FrameDocument>>().unwrap_or_default(),
            Err(e) => {
                debug!("Frame traversal failed: {}", e);
                Vec::new()
            }
        }
    }

    /// 生成当前页面快照
    pub async fn snapshot(&self, url: &str) -> Result<PageSnapshot, EngineError> {
        let html = self.content().await?;
        let body_text = self.body_text().await.unwrap_or_default();
        let frames = self.frames().await;
        Ok(PageSnapshot {
            url: url.to_string(),
            html,
            body_text,
            frames,
        })
    }

    /// 释放会话
    pub async fn close(mut self) {
        if let Err(e) = self.page.clone().close().await {
            debug!("Failed to close page: {}", e);
        }
        if self.owns_browser {
            if let Err(e) = self.browser.close().await {
                warn!("Failed to close browser: {}", e);
            }
            let _ = self.browser.wait().await;
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}
