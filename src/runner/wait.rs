use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, sleep, timeout};
use tracing::trace;

use crate::browser::PageElement;
use crate::{DriverError, Result};

/// poll_until 的失败原因
#[derive(Debug)]
pub enum PollError<T> {
    /// 读取本身失败
    Read(DriverError),
    /// 超时，附带最后一次读到的值
    TimedOut { waited: Duration, last: Option<T> },
}

impl From<PollError<String>> for DriverError {
    fn from(err: PollError<String>) -> Self {
        match err {
            PollError::Read(e) => e,
            PollError::TimedOut { waited, last } => DriverError::Timeout {
                waited,
                last_status: last,
            },
        }
    }
}

/// 反复调用 `read`，直到 `done` 返回 true 或超时
///
/// 每次读取之间等待 `interval`，为 0 时只让出一次调度。
/// 超时同时约束读取本身：挂起的读取也会在到期时被取消。
pub async fn poll_until<T, F, Fut, P>(
    limit: Duration,
    interval: Duration,
    mut read: F,
    mut done: P,
) -> std::result::Result<T, PollError<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: FnMut(&T) -> bool,
{
    let start = Instant::now();
    let mut last = None;
    let mut reads = 0usize;

    let polled = timeout(limit, async {
        loop {
            let value = read().await.map_err(PollError::Read)?;
            reads += 1;
            if done(&value) {
                return Ok::<T, PollError<T>>(value);
            }
            last = Some(value);

            if interval.is_zero() {
                tokio::task::yield_now().await;
            } else {
                sleep(interval).await;
            }
        }
    })
    .await;

    trace!(reads, elapsed_ms = start.elapsed().as_millis() as u64, "poll finished");

    match polled {
        Ok(result) => result,
        Err(_) => Err(PollError::TimedOut {
            waited: start.elapsed(),
            last,
        }),
    }
}

/// 等待状态元素离开 running 文本，返回第一个不同的值
pub async fn await_completion<E: PageElement>(
    status: &E,
    running_text: &str,
    limit: Duration,
    interval: Duration,
) -> Result<String> {
    poll_until(limit, interval, move || status.text(), |text| text != running_text)
        .await
        .map_err(DriverError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test(start_paused = true)]
    async fn test_poll_until_returns_first_match() {
        let counter = Cell::new(0);
        let result = poll_until(
            Duration::from_secs(1),
            Duration::from_millis(10),
            || {
                counter.set(counter.get() + 1);
                let n = counter.get();
                async move { Ok(n) }
            },
            |n| *n == 3,
        )
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(counter.get(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_until_times_out_with_last_value() {
        let result = poll_until(
            Duration::from_millis(200),
            Duration::from_millis(20),
            || async { Ok("Running".to_string()) },
            |s| s != "Running",
        )
        .await;

        match result {
            Err(PollError::TimedOut { waited, last }) => {
                assert!(waited >= Duration::from_millis(200));
                assert_eq!(last.as_deref(), Some("Running"));
            }
            other => panic!("Expected timeout, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_read_is_cancelled() {
        let result: std::result::Result<String, _> = poll_until(
            Duration::from_millis(100),
            Duration::from_millis(10),
            || async {
                futures::future::pending::<()>().await;
                Ok("never".to_string())
            },
            |_| true,
        )
        .await;

        assert!(matches!(
            result,
            Err(PollError::TimedOut { last: None, .. })
        ));
    }

    #[tokio::test]
    async fn test_read_error_stops_polling() {
        let result: std::result::Result<String, _> = poll_until(
            Duration::from_secs(1),
            Duration::ZERO,
            || async { Err(DriverError::Session("gone".to_string())) },
            |_| true,
        )
        .await;

        let err: DriverError = result.unwrap_err().into();
        assert!(matches!(err, DriverError::Session(_)));
    }
}
