use std::time::Duration;

use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, info, warn};

use crate::{DriverError, Result};

const PROBE_INTERVAL: Duration = Duration::from_millis(100);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// 在启动浏览器前确认目标页面已经可以访问
///
/// 每 100ms 发一次 GET，收到 2xx 即返回。`limit` 同时约束正在进行的请求：
/// 接受连接但从不响应的服务也会在到期时失败。
pub async fn wait_for_target(url: &str, limit: Duration) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()?;

    let start = Instant::now();
    let mut attempts = 0;

    let probed = timeout(limit, async {
        loop {
            attempts += 1;

            match client.get(url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    debug!(attempts, "Target {} is reachable", url);
                    return;
                }
                Ok(resp) => {
                    warn!("Preflight returned {}", resp.status());
                }
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for {} to come up...", url);
                    }
                    // 服务启动前连接被拒绝是正常的
                    if !e.is_connect() {
                        warn!("Preflight error: {}", e);
                    }
                }
            }

            sleep(PROBE_INTERVAL).await;
        }
    })
    .await;

    match probed {
        Ok(()) => Ok(()),
        Err(_) => {
            debug!(
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Preflight gave up"
            );
            Err(DriverError::TargetUnreachable {
                url: url.to_string(),
                attempts,
            })
        }
    }
}
