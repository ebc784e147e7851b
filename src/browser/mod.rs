//! 浏览器自动化接口
//!
//! 编排逻辑只依赖这里的三个 trait，具体的自动化客户端（Chromium/CDP）
//! 在 [`chromium`] 中实现，测试中用脚本化的假实现替换。

pub mod chromium;

use crate::Result;
use crate::config::LaunchOptions;

pub use chromium::ChromiumDriver;

/// 启动浏览器会话
#[allow(async_fn_in_trait)]
pub trait BrowserDriver {
    type Session: BrowserSession;

    async fn open(&self, options: &LaunchOptions) -> Result<Self::Session>;
}

/// 一个已打开的浏览器会话
#[allow(async_fn_in_trait)]
pub trait BrowserSession {
    type Element: PageElement;

    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// 按 CSS 选择器查找元素，找不到时返回 `DriverError::ElementNotFound`
    async fn find_element(&self, selector: &str) -> Result<Self::Element>;

    /// 释放会话。消耗 self，所以每个会话最多只能释放一次
    async fn close(self) -> Result<()>;
}

/// 页面上的一个元素
#[allow(async_fn_in_trait)]
pub trait PageElement {
    /// 元素当前的可见文本
    async fn text(&self) -> Result<String>;
}
