use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::{DriverError, Result};

/// 运行中的状态文本
pub const RUNNING_SENTINEL: &str = "Running";
/// 测试通过时的状态文本
pub const SUCCESS_SENTINEL: &str = "exit: 0";

/// 部分配置，配置文件和命令行各产生一层
///
/// 所有字段都是可选的，未设置的字段不会覆盖下层的值。
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PartialConfig {
    pub url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub poll_interval_ms: Option<u64>,
    pub status_selector: Option<String>,
    pub output_selector: Option<String>,
    pub running_text: Option<String>,
    pub success_text: Option<String>,
    pub sandbox: Option<bool>,
    pub chrome_executable: Option<PathBuf>,
    pub preflight_timeout_ms: Option<u64>,
    pub report_json: Option<PathBuf>,
}

/// 浏览器启动参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    /// false 时附加 `--no-sandbox`
    pub sandbox: bool,
    /// Chromium 可执行文件路径，None 时由驱动自行查找
    pub executable: Option<PathBuf>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            sandbox: true,
            executable: None,
        }
    }
}

impl LaunchOptions {
    /// 构建无头浏览器的命令行参数
    pub fn configure(&self) -> Vec<String> {
        let mut args = vec!["--headless".to_string(), "--disable-gpu".to_string()];
        if !self.sandbox {
            args.push("--no-sandbox".to_string());
        }
        args
    }
}

/// 合并后的完整配置
#[derive(Debug, Clone)]
pub struct DriverConfig {
    pub url: String,
    pub timeout: Duration,
    pub poll_interval: Duration,
    pub status_selector: String,
    pub output_selector: String,
    pub running_text: String,
    pub success_text: String,
    pub launch: LaunchOptions,
    pub preflight_timeout: Option<Duration>,
    pub report_json: Option<PathBuf>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080/".to_string(),
            timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(50),
            status_selector: "#status".to_string(),
            output_selector: "#output".to_string(),
            running_text: RUNNING_SENTINEL.to_string(),
            success_text: SUCCESS_SENTINEL.to_string(),
            launch: LaunchOptions::default(),
            preflight_timeout: None,
            report_json: None,
        }
    }
}

impl DriverConfig {
    /// 按顺序叠加各层配置，后面的层优先
    pub fn from_layers<'a>(layers: impl IntoIterator<Item = &'a PartialConfig>) -> Self {
        let mut config = Self::default();
        for layer in layers {
            config.apply(layer);
        }
        config
    }

    pub fn apply(&mut self, layer: &PartialConfig) {
        if let Some(url) = &layer.url {
            self.url = url.clone();
        }
        if let Some(ms) = layer.timeout_ms {
            self.timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = layer.poll_interval_ms {
            self.poll_interval = Duration::from_millis(ms);
        }
        if let Some(selector) = &layer.status_selector {
            self.status_selector = selector.clone();
        }
        if let Some(selector) = &layer.output_selector {
            self.output_selector = selector.clone();
        }
        if let Some(text) = &layer.running_text {
            self.running_text = text.clone();
        }
        if let Some(text) = &layer.success_text {
            self.success_text = text.clone();
        }
        if let Some(sandbox) = layer.sandbox {
            self.launch.sandbox = sandbox;
        }
        if let Some(path) = &layer.chrome_executable {
            self.launch.executable = Some(path.clone());
        }
        if let Some(ms) = layer.preflight_timeout_ms {
            // 0 表示关闭探测
            self.preflight_timeout = (ms > 0).then(|| Duration::from_millis(ms));
        }
        if let Some(path) = &layer.report_json {
            self.report_json = Some(path.clone());
        }
    }

    /// 校验配置
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.url)?;
        if !matches!(url.scheme(), "http" | "https" | "file") {
            return Err(DriverError::Config(format!(
                "不支持的 URL 协议: {}",
                url.scheme()
            )));
        }
        if self.timeout.is_zero() {
            return Err(DriverError::Config("timeout 必须大于 0".to_string()));
        }
        if self.status_selector.trim().is_empty() || self.output_selector.trim().is_empty() {
            return Err(DriverError::Config("元素选择器不能为空".to_string()));
        }
        Ok(())
    }
}
