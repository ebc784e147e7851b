use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("浏览器会话错误: {0}")]
    Session(String),

    #[error("找不到页面元素 {selector}: {reason}")]
    ElementNotFound { selector: String, reason: String },

    #[error(
        "等待超时 ({}ms), 最后状态: {}",
        .waited.as_millis(),
        .last_status.as_deref().unwrap_or("无")
    )]
    Timeout {
        waited: Duration,
        last_status: Option<String>,
    },

    #[error("Test finished with status text: {status}")]
    Assertion { status: String },

    #[error("目标地址不可达: {url} (尝试 {attempts} 次)")]
    TargetUnreachable { url: String, attempts: usize },

    #[error("配置错误: {0}")]
    Config(String),

    #[error("URL 解析错误: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON 错误: {0}")]
    Json(#[from] serde_json::Error),
}

impl DriverError {
    pub fn session(err: impl std::fmt::Display) -> Self {
        DriverError::Session(err.to_string())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, DriverError::Timeout { .. })
    }
}

impl From<chromiumoxide::error::CdpError> for DriverError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        DriverError::Session(err.to_string())
    }
}

impl From<reqwest::Error> for DriverError {
    fn from(err: reqwest::Error) -> Self {
        DriverError::Session(format!("HTTP 客户端错误: {}", err))
    }
}

/// Result type for wasm-test-driver crate
pub type Result<T> = std::result::Result<T, DriverError>;
