use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};

use wasm_test_driver::config::{ConfigLoader, DriverConfig, PartialConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// If false, launches Chrome with --no-sandbox
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        default_missing_value = "true",
        conflicts_with = "no_sandbox"
    )]
    pub sandbox: Option<bool>,

    /// Same as --sandbox=false
    #[arg(long)]
    pub no_sandbox: bool,

    /// Page to open (default http://localhost:8080/)
    #[arg(long)]
    pub url: Option<String>,

    /// How long to wait for the status to leave "Running", in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Delay between status reads, in milliseconds
    #[arg(long, value_name = "MS")]
    pub poll_interval: Option<u64>,

    /// CSS selector of the status element
    #[arg(long)]
    pub status_selector: Option<String>,

    /// CSS selector of the output element
    #[arg(long)]
    pub output_selector: Option<String>,

    /// Path to the Chrome/Chromium executable
    #[arg(long, value_name = "PATH")]
    pub chrome: Option<PathBuf>,

    /// Wait up to MS for the page to answer before launching the browser (0 disables)
    #[arg(long, value_name = "MS")]
    pub preflight_timeout: Option<u64>,

    /// Write a JSON run report to PATH
    #[arg(long, value_name = "PATH")]
    pub report_json: Option<PathBuf>,

    /// Config file (default: search for test-driver.toml)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// -v for debug, -vv for trace
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// 命令行这一层的配置
    pub fn overrides(&self) -> PartialConfig {
        let sandbox = if self.no_sandbox {
            Some(false)
        } else {
            self.sandbox
        };

        PartialConfig {
            url: self.url.clone(),
            timeout_ms: self.timeout,
            poll_interval_ms: self.poll_interval,
            status_selector: self.status_selector.clone(),
            output_selector: self.output_selector.clone(),
            sandbox,
            chrome_executable: self.chrome.clone(),
            preflight_timeout_ms: self.preflight_timeout,
            report_json: self.report_json.clone(),
            ..Default::default()
        }
    }

    /// 默认值 < 配置文件 < 命令行
    pub fn resolve_config(&self) -> Result<DriverConfig> {
        let file = match &self.config {
            Some(path) => Some(
                ConfigLoader::load_from_path(path)
                    .with_context(|| format!("loading {}", path.display()))?,
            ),
            None => ConfigLoader::find_and_load().context("loading test-driver.toml")?,
        };

        let cli = self.overrides();
        let config = DriverConfig::from_layers(file.iter().chain(std::iter::once(&cli)));
        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sandbox_defaults_to_unset() {
        let cli = Cli::parse_from(["wasm-test-driver"]);
        assert_eq!(cli.overrides().sandbox, None);
    }

    #[test]
    fn test_sandbox_flag_forms() {
        let cli = Cli::parse_from(["wasm-test-driver", "--sandbox=false"]);
        assert_eq!(cli.overrides().sandbox, Some(false));

        let cli = Cli::parse_from(["wasm-test-driver", "--sandbox"]);
        assert_eq!(cli.overrides().sandbox, Some(true));

        let cli = Cli::parse_from(["wasm-test-driver", "--no-sandbox"]);
        assert_eq!(cli.overrides().sandbox, Some(false));

        assert!(Cli::try_parse_from(["wasm-test-driver", "--sandbox", "--no-sandbox"]).is_err());
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from([
            "wasm-test-driver",
            "--url",
            "http://127.0.0.1:3000/",
            "--timeout",
            "2500",
            "--status-selector",
            "#state",
            "-vv",
        ]);
        let layer = cli.overrides();
        assert_eq!(layer.url.as_deref(), Some("http://127.0.0.1:3000/"));
        assert_eq!(layer.timeout_ms, Some(2500));
        assert_eq!(layer.status_selector.as_deref(), Some("#state"));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_resolve_config_with_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("driver.toml");
        std::fs::write(&path, "timeout_ms = 4000\nsandbox = false\n").unwrap();

        let cli = Cli::parse_from([
            "wasm-test-driver",
            "--config",
            path.to_str().unwrap(),
            "--sandbox=true",
        ]);
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.timeout.as_millis(), 4000);
        assert!(config.launch.sandbox);
    }

    #[test]
    fn test_resolve_config_rejects_bad_url() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("driver.toml");
        std::fs::write(&path, "").unwrap();

        let cli = Cli::parse_from([
            "wasm-test-driver",
            "--config",
            path.to_str().unwrap(),
            "--url",
            "::nope::",
        ]);
        assert!(cli.resolve_config().is_err());
    }
}
