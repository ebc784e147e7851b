mod cli;

use std::process::ExitCode;

use clap::Parser;
use cli::Cli;
use wasm_test_driver::browser::ChromiumDriver;
use wasm_test_driver::runner::TestRunner;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // 初始化日志系统
    wasm_test_driver::logger::init_logger(cli.verbose);

    let config = match cli.resolve_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut runner = TestRunner::new(ChromiumDriver::new(), config);
    runner.run().await.exit_code()
}
