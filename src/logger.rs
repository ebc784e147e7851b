use tracing_subscriber::{EnvFilter, fmt};

/// 初始化日志系统
///
/// 日志统一写到 stderr, stdout 只留给页面输出。
/// 优先使用 RUST_LOG 环境变量, 否则按 `-v` 次数选择级别:
/// - 0: info
/// - 1: debug
/// - 2+: trace
pub fn init_logger(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    tracing::debug!("Logger initialized");
}

fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}
