use std::io::{self, Write};

use colored::Colorize;

use crate::runner::types::RunOutcome;
use crate::{DriverError, Result};

/// 负责 stdout 上的页面输出和 stderr 上的诊断信息
pub struct TestReporter<W: Write, E: Write> {
    out: W,
    err: E,
    success_text: String,
}

impl<W: Write, E: Write> TestReporter<W, E> {
    pub fn new(out: W, err: E, success_text: impl Into<String>) -> Self {
        Self {
            out,
            err,
            success_text: success_text.into(),
        }
    }

    /// 原样输出页面内容，然后检查状态文本
    ///
    /// 输出总是先于断言写出，测试失败时也能看到页面日志。
    pub fn report(&mut self, output_text: &str, status_text: &str) -> Result<()> {
        writeln!(self.out, "{}", output_text)?;
        self.out.flush()?;

        if status_text != self.success_text {
            return Err(DriverError::Assertion {
                status: status_text.to_string(),
            });
        }
        Ok(())
    }

    /// 打印失败原因
    pub fn print_failure(&mut self, error: &DriverError) -> io::Result<()> {
        writeln!(self.err, "{}", "Exception in test driver:".red().bold())?;
        writeln!(self.err, "  {}", error)?;
        self.err.flush()
    }

    /// 打印一行摘要
    pub fn print_summary(&mut self, outcome: &RunOutcome) -> io::Result<()> {
        let elapsed = format!("{:.3}s", outcome.duration.as_secs_f64());
        if outcome.passed() {
            writeln!(
                self.err,
                " {} {} ({})",
                "✓".green(),
                "PASSED".green().bold(),
                elapsed
            )?;
        } else {
            let phase = outcome
                .failed_in
                .map(|p| format!(" during {}", p))
                .unwrap_or_default();
            writeln!(
                self.err,
                " {} {}{} ({})",
                "✗".red(),
                "FAILED".red().bold(),
                phase,
                elapsed
            )?;
        }

        if let Some(e) = &outcome.release_error {
            writeln!(self.err, "   {}: {}", "Warning".yellow(), e)?;
        }
        self.err.flush()
    }

    /// 取回 (stdout, stderr) 两个输出流
    pub fn into_inner(self) -> (W, E) {
        (self.out, self.err)
    }
}
