use std::fmt;
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::{DriverError, Result};

/// 单次运行的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Starting,
    SessionAcquired,
    NavigatedToTarget,
    Polling,
    Completed,
    TimedOut,
    Errored,
    SessionReleased,
    Exited,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Starting => "starting",
            RunPhase::SessionAcquired => "session-acquired",
            RunPhase::NavigatedToTarget => "navigated",
            RunPhase::Polling => "polling",
            RunPhase::Completed => "completed",
            RunPhase::TimedOut => "timed-out",
            RunPhase::Errored => "errored",
            RunPhase::SessionReleased => "session-released",
            RunPhase::Exited => "exited",
        };
        f.write_str(name)
    }
}

/// 记录当前阶段并输出迁移日志
#[derive(Debug)]
pub(crate) struct PhaseTracker {
    current: RunPhase,
}

impl PhaseTracker {
    pub(crate) fn new() -> Self {
        Self {
            current: RunPhase::Starting,
        }
    }

    pub(crate) fn current(&self) -> RunPhase {
        self.current
    }

    pub(crate) fn advance(&mut self, next: RunPhase) {
        debug!(from = %self.current, to = %next, "phase transition");
        self.current = next;
    }
}

/// 运行结论
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Passed,
    Failed,
}

impl Verdict {
    pub fn code(self) -> u8 {
        match self {
            Verdict::Passed => 0,
            Verdict::Failed => 1,
        }
    }
}

/// 一次运行的完整结果
#[derive(Debug)]
pub struct RunOutcome {
    pub verdict: Verdict,
    /// 导致失败的错误
    pub error: Option<DriverError>,
    /// 出错时所处的阶段
    pub failed_in: Option<RunPhase>,
    /// 最后读到的状态文本
    pub status_text: Option<String>,
    /// 输出元素的文本
    pub output_text: Option<String>,
    /// 是否获取过浏览器会话
    pub session_acquired: bool,
    /// 释放会话时的错误，不影响 verdict
    pub release_error: Option<DriverError>,
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
}

impl RunOutcome {
    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Passed
    }

    pub fn code(&self) -> u8 {
        self.verdict.code()
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }
}

/// 写入 JSON 文件的运行报告
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub url: String,
    pub verdict: Verdict,
    pub exit_code: u8,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub status_text: Option<String>,
    pub output_text: Option<String>,
    pub error: Option<String>,
    pub failed_in: Option<RunPhase>,
    pub release_error: Option<String>,
}

impl RunReport {
    pub fn from_outcome(url: &str, outcome: &RunOutcome) -> Self {
        Self {
            url: url.to_string(),
            verdict: outcome.verdict,
            exit_code: outcome.code(),
            started_at: outcome.started_at,
            duration_ms: outcome.duration.as_millis() as u64,
            status_text: outcome.status_text.clone(),
            output_text: outcome.output_text.clone(),
            error: outcome.error.as_ref().map(|e| e.to_string()),
            failed_in: outcome.failed_in,
            release_error: outcome.release_error.as_ref().map(|e| e.to_string()),
        }
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
