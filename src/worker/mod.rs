//! Worker client
//!
//! A worker is an independent process that discovers the dispatcher, connects,
//! and then loops: request a script, run it to completion, request another.
//! Exactly one script is in flight per worker; that sequencing is the only
//! backpressure in the system. Nothing is reported back to the dispatcher:
//! once a script is received, the dispatcher has no further visibility into
//! it.

use crate::config::WorkerConfig;
use crate::discovery::DiscoveryRecord;
use crate::protocol::{read_frame, write_frame, Response, TOKEN_NEXT};
use anyhow::{Context, Result};
use tokio::net::TcpStream;

/// Pull/execute client for one machine
pub struct Worker {
    config: WorkerConfig,
}

impl Worker {
    pub fn new(config: WorkerConfig) -> Self {
        Self { config }
    }

    /// Run the worker until the dispatcher answers `quit`
    ///
    /// Bootstrap faults (unreadable discovery record, failed connect) are
    /// fatal: the error propagates and the process exits with no retry.
    pub async fn run(self) -> Result<()> {
        let record = DiscoveryRecord::load(&self.config.discovery_file)?;
        println!("Connecting to dispatcher at {}", record.address());

        let mut stream = TcpStream::connect(record.address())
            .await
            .with_context(|| format!("Failed to connect to dispatcher at {}", record.address()))?;
        println!("Connected");

        loop {
            write_frame(&mut stream, TOKEN_NEXT.as_bytes()).await?;
            let payload = read_frame(&mut stream).await?;

            match Response::parse(&payload)? {
                Response::Quit => break,
                Response::Wait => {
                    println!("Waiting...");
                    tokio::time::sleep(self.config.wait_interval).await;
                }
                Response::Item(path) => {
                    println!("Running test: {}", path);
                    run_script(&path).await;
                }
            }
        }

        println!("Worker shutting down");
        Ok(())
    }
}

/// Execute one dispatched script synchronously
///
/// The script is invoked as a self-contained command with no arguments. Its
/// exit status is not inspected; a script that cannot be spawned at all is
/// logged and skipped so the worker can ask for the next one.
async fn run_script(path: &str) {
    match tokio::process::Command::new(path).status().await {
        Ok(_) => {}
        Err(e) => eprintln!("Failed to run {}: {}", path, e),
    }
}
