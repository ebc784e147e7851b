use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::browser::{BrowserDriver, BrowserSession, PageElement};
use crate::config::LaunchOptions;
use crate::{DriverError, Result};

/// 通过 DevTools 协议驱动本地 Chromium
#[derive(Debug, Clone, Default)]
pub struct ChromiumDriver;

impl ChromiumDriver {
    pub fn new() -> Self {
        Self
    }

    fn browser_config(options: &LaunchOptions) -> Result<BrowserConfig> {
        // 无头参数完全由 configure() 决定
        let mut builder = BrowserConfig::builder()
            .with_head()
            .args(options.configure());

        if let Some(path) = &options.executable {
            builder = builder.chrome_executable(path);
        }

        builder.build().map_err(DriverError::Session)
    }
}

impl BrowserDriver for ChromiumDriver {
    type Session = ChromiumSession;

    async fn open(&self, options: &LaunchOptions) -> Result<ChromiumSession> {
        let config = Self::browser_config(options)?;
        debug!(args = ?options.configure(), "Launching Chromium");

        let (mut browser, mut handler) = Browser::launch(config).await?;

        // CDP 消息必须持续被消费，否则所有请求都会挂起
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    trace!("CDP handler error: {}", e);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                // 浏览器进程已经起来了，不能泄漏
                if let Some(Err(kill_err)) = browser.kill().await {
                    warn!("Failed to kill Chromium after page error: {}", kill_err);
                }
                handler.abort();
                return Err(e.into());
            }
        };

        Ok(ChromiumSession {
            browser,
            page,
            handler,
        })
    }
}

pub struct ChromiumSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl BrowserSession for ChromiumSession {
    type Element = ChromiumElement;

    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| DriverError::Session(format!("无法打开 {}: {}", url, e)))?;
        Ok(())
    }

    async fn find_element(&self, selector: &str) -> Result<ChromiumElement> {
        let inner = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| DriverError::ElementNotFound {
                selector: selector.to_string(),
                reason: e.to_string(),
            })?;
        Ok(ChromiumElement { inner })
    }

    async fn close(mut self) -> Result<()> {
        let closed = self.browser.close().await;

        match &closed {
            Ok(_) => {
                if let Err(e) = self.browser.wait().await {
                    warn!("Failed to wait for Chromium to exit: {}", e);
                }
            }
            Err(e) => {
                warn!("Chromium did not close cleanly ({}), killing it", e);
                if let Some(Err(kill_err)) = self.browser.kill().await {
                    warn!("Failed to kill Chromium: {}", kill_err);
                }
            }
        }

        self.handler.abort();
        closed.map(|_| ()).map_err(DriverError::from)
    }
}

pub struct ChromiumElement {
    inner: Element,
}

impl PageElement for ChromiumElement {
    async fn text(&self) -> Result<String> {
        Ok(self.inner.inner_text().await?.unwrap_or_default())
    }
}
