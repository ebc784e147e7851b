use std::io::{self, Write};
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::browser::{BrowserDriver, BrowserSession, PageElement};
use crate::config::DriverConfig;
use crate::runner::preflight;
use crate::runner::reporter::TestReporter;
use crate::runner::types::{PhaseTracker, RunOutcome, RunPhase, RunReport, Verdict};
use crate::runner::wait::await_completion;
use crate::{DriverError, Result};

/// 运行期间从页面读到的内容
#[derive(Debug, Default)]
struct Observation {
    status_text: Option<String>,
    output_text: Option<String>,
}

/// 执行一次浏览器测试
pub struct TestRunner<D: BrowserDriver, W: Write = io::Stdout, E: Write = io::Stderr> {
    driver: D,
    config: DriverConfig,
    reporter: TestReporter<W, E>,
}

impl<D: BrowserDriver> TestRunner<D> {
    pub fn new(driver: D, config: DriverConfig) -> Self {
        Self::with_writers(driver, config, io::stdout(), io::stderr())
    }
}

impl<D: BrowserDriver, W: Write, E: Write> TestRunner<D, W, E> {
    /// 指定页面输出流和诊断输出流
    pub fn with_writers(driver: D, config: DriverConfig, out: W, err: E) -> Self {
        let reporter = TestReporter::new(out, err, config.success_text.clone());
        Self {
            driver,
            config,
            reporter,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// 取回 (stdout, stderr) 两个输出流
    pub fn into_writers(self) -> (W, E) {
        self.reporter.into_inner()
    }

    /// 完整执行一次测试
    ///
    /// 不会返回错误：所有失败都记录在 [`RunOutcome`] 中。会话一旦获取成功，
    /// 无论后续哪一步失败都会被释放且只释放一次，释放失败不改变结论。
    pub async fn run(&mut self) -> RunOutcome {
        let started_at = Utc::now();
        let start = Instant::now();
        let mut phases = PhaseTracker::new();
        let mut observed = Observation::default();

        info!("Testing {}", self.config.url);

        if let Some(limit) = self.config.preflight_timeout {
            if let Err(e) = preflight::wait_for_target(&self.config.url, limit).await {
                return self.finish(phases, Err(e), observed, None, false, started_at, start);
            }
        }

        let mut session = match self.driver.open(&self.config.launch).await {
            Ok(session) => session,
            Err(e) => {
                return self.finish(phases, Err(e), observed, None, false, started_at, start);
            }
        };
        phases.advance(RunPhase::SessionAcquired);

        let result = self.drive(&mut session, &mut phases, &mut observed).await;

        let release_error = match session.close().await {
            Ok(()) => None,
            Err(e) => {
                warn!("Failed to release browser session: {}", e);
                Some(e)
            }
        };

        self.finish(phases, result, observed, release_error, true, started_at, start)
    }

    /// 导航、定位元素、轮询并报告。只借用会话，释放由调用方负责
    async fn drive(
        &mut self,
        session: &mut D::Session,
        phases: &mut PhaseTracker,
        observed: &mut Observation,
    ) -> Result<()> {
        session.navigate(&self.config.url).await?;
        phases.advance(RunPhase::NavigatedToTarget);

        let status = session.find_element(&self.config.status_selector).await?;
        let output = session.find_element(&self.config.output_selector).await?;

        phases.advance(RunPhase::Polling);
        let first_final = await_completion(
            &status,
            &self.config.running_text,
            self.config.timeout,
            self.config.poll_interval,
        )
        .await?;
        debug!(status = %first_final, "Status left running state");
        observed.status_text = Some(first_final);

        let output_text = output.text().await?;
        observed.output_text = Some(output_text.clone());
        let status_text = status.text().await?;
        observed.status_text = Some(status_text.clone());

        self.reporter.report(&output_text, &status_text)
    }

    #[allow(clippy::too_many_arguments)]
    fn finish(
        &mut self,
        mut phases: PhaseTracker,
        result: Result<()>,
        observed: Observation,
        release_error: Option<DriverError>,
        session_acquired: bool,
        started_at: DateTime<Utc>,
        start: Instant,
    ) -> RunOutcome {
        let (verdict, error, failed_in) = match result {
            Ok(()) => {
                phases.advance(RunPhase::Completed);
                (Verdict::Passed, None, None)
            }
            Err(e) => {
                let failed_in = phases.current();
                error!(phase = %failed_in, "Test run failed: {}", e);
                if let Err(io_err) = self.reporter.print_failure(&e) {
                    warn!("Failed to print failure: {}", io_err);
                }
                phases.advance(if e.is_timeout() {
                    RunPhase::TimedOut
                } else {
                    RunPhase::Errored
                });
                (Verdict::Failed, Some(e), Some(failed_in))
            }
        };

        if session_acquired {
            phases.advance(RunPhase::SessionReleased);
        }

        let outcome = RunOutcome {
            verdict,
            error,
            failed_in,
            status_text: observed.status_text,
            output_text: observed.output_text,
            session_acquired,
            release_error,
            started_at,
            duration: start.elapsed(),
        };

        if let Some(path) = &self.config.report_json {
            let report = RunReport::from_outcome(&self.config.url, &outcome);
            if let Err(e) = report.write_json(path) {
                warn!("Failed to write report to {}: {}", path.display(), e);
            }
        }

        if let Err(e) = self.reporter.print_summary(&outcome) {
            warn!("Failed to print summary: {}", e);
        }
        phases.advance(RunPhase::Exited);
        outcome
    }
}
