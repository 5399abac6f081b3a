//! SimSweep CLI entry point

use anyhow::{Context, Result};
use simsweep::config::cli::{Cli, ExecutionMode};
use simsweep::config::{DispatcherConfig, WorkerConfig};
use simsweep::dispatch::Dispatcher;
use simsweep::worker::Worker;

fn main() -> Result<()> {
    println!("SimSweep v{}", env!("CARGO_PKG_VERSION"));
    println!();

    let cli = Cli::parse_args();
    cli.validate()?;

    match cli.mode {
        ExecutionMode::Dispatcher => run_dispatcher(cli),
        ExecutionMode::Worker => run_worker(cli),
    }
}

/// Run in dispatcher mode (queue owner)
fn run_dispatcher(cli: Cli) -> Result<()> {
    let config = DispatcherConfig::from_cli(&cli);

    let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    runtime.block_on(async {
        let dispatcher = Dispatcher::new(config).context("Failed to create dispatcher")?;
        dispatcher.run().await
    })
}

/// Run in worker mode (pull and execute)
fn run_worker(cli: Cli) -> Result<()> {
    let config = WorkerConfig::from_cli(&cli);

    let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    runtime.block_on(async { Worker::new(config).run().await })
}
