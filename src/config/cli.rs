//! CLI argument parsing using clap

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Execution mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExecutionMode {
    /// Dispatcher mode (default) - own the queue and serve scripts to workers
    Dispatcher,
    /// Worker mode - pull scripts from the dispatcher and execute them
    Worker,
}

/// SimSweep - distributed test-script dispatcher
#[derive(Parser, Debug)]
#[command(name = "simsweep")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Execution mode: dispatcher or worker
    #[arg(long, value_enum, default_value = "dispatcher")]
    pub mode: ExecutionMode,

    /// Directory scanned once at startup for test scripts (dispatcher mode)
    #[arg(long, default_value = "tests")]
    pub tests_dir: PathBuf,

    /// Substring a file name must contain to be queued (dispatcher mode)
    #[arg(long, default_value = "Run")]
    pub name_contains: String,

    /// Suffix a file name must end with to be queued (dispatcher mode)
    #[arg(long, default_value = ".py")]
    pub name_suffix: String,

    /// Port the dispatcher listens on
    #[arg(short = 'p', long, default_value = "8771")]
    pub port: u16,

    /// Address advertised to workers in the discovery record
    ///
    /// Defaults to this machine's hostname when not given.
    #[arg(long)]
    pub host: Option<String>,

    /// Path of the discovery record written by the dispatcher and read by workers
    #[arg(long, default_value = "dispatcher.addr")]
    pub discovery_file: PathBuf,

    /// Seconds a worker sleeps after a `wait` response before asking again
    #[arg(long, default_value = "10")]
    pub wait_interval: u64,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate argument combinations
    pub fn validate(&self) -> crate::Result<()> {
        if self.name_suffix.is_empty() && self.name_contains.is_empty() {
            anyhow::bail!("At least one of --name-contains or --name-suffix must be non-empty");
        }
        if self.wait_interval == 0 {
            anyhow::bail!("--wait-interval must be at least 1 second");
        }
        Ok(())
    }
}
