use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::types::PartialConfig;
use crate::{DriverError, Result};

/// 配置文件加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 配置文件名
    pub const CONFIG_FILE: &'static str = "test-driver.toml";

    /// 从指定路径加载配置文件
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<PartialConfig> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            DriverError::Config(format!("无法读取配置文件 {}: {}", path.display(), e))
        })?;

        toml::from_str(&content).map_err(|e| {
            DriverError::Config(format!("无法解析配置文件 {}: {}", path.display(), e))
        })
    }

    /// 查找并加载配置文件
    /// 查找顺序：
    /// 1. 当前目录及其父目录
    /// 2. 用户配置目录 ~/.config/wasm-test-driver/
    ///
    /// 找到但解析失败的文件会返回错误，而不是被静默忽略。
    pub fn find_and_load() -> Result<Option<PartialConfig>> {
        if let Ok(dir) = std::env::current_dir() {
            if let Some(config) = Self::search_upwards(&dir)? {
                return Ok(Some(config));
            }
        }

        Self::try_load_from_user_dir()
    }

    /// 从 `start` 开始向上逐级查找
    pub fn search_upwards(start: &Path) -> Result<Option<PartialConfig>> {
        let mut current = start.to_path_buf();

        loop {
            let config_path = current.join(Self::CONFIG_FILE);
            if config_path.is_file() {
                debug!("Loading config from {}", config_path.display());
                return Self::load_from_path(&config_path).map(Some);
            }

            if !current.pop() {
                return Ok(None);
            }
        }
    }

    fn try_load_from_user_dir() -> Result<Option<PartialConfig>> {
        let Some(home) = dirs::home_dir() else {
            return Ok(None);
        };
        let config_path = home
            .join(".config")
            .join("wasm-test-driver")
            .join(Self::CONFIG_FILE);

        if config_path.is_file() {
            debug!("Loading config from {}", config_path.display());
            Self::load_from_path(&config_path).map(Some)
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_load_from_path() {
        let config_content = r##"
url = "http://localhost:9090/"
timeout_ms = 30000
sandbox = false
status_selector = "#result"
"##;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(config_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = ConfigLoader::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.url.as_deref(), Some("http://localhost:9090/"));
        assert_eq!(config.timeout_ms, Some(30000));
        assert_eq!(config.sandbox, Some(false));
        assert_eq!(config.status_selector.as_deref(), Some("#result"));
        assert!(config.output_selector.is_none());
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"timeuot_ms = 5\n").unwrap();
        temp_file.flush().unwrap();

        let err = ConfigLoader::load_from_path(temp_file.path()).unwrap_err();
        assert!(matches!(err, DriverError::Config(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigLoader::load_from_path("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("无法读取配置文件"));
    }

    #[test]
    fn test_search_upwards() {
        let root = TempDir::new().unwrap();
        fs::write(
            root.path().join(ConfigLoader::CONFIG_FILE),
            "poll_interval_ms = 10\n",
        )
        .unwrap();
        let nested = root.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let config = ConfigLoader::search_upwards(&nested).unwrap().unwrap();
        assert_eq!(config.poll_interval_ms, Some(10));
    }
}
