//! Dispatcher server
//!
//! Accepts worker connections indefinitely and runs one session task per
//! connection. A session bridges exactly one worker to the queue: it reads a
//! framed request, closes on the literal `quit`, and otherwise answers with
//! whatever the queue accessor hands back. Sessions share nothing but the
//! queue, so an I/O fault on one connection never disturbs the others.

use crate::config::DispatcherConfig;
use crate::discovery::DiscoveryRecord;
use crate::dispatch::queue::{Dispatch, WorkQueue};
use crate::protocol::{read_frame, write_frame, Response, TOKEN_QUIT};
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;

/// Dispatch server
///
/// Owns the work queue and serves it to workers over TCP.
pub struct Dispatcher {
    config: DispatcherConfig,
    queue: Arc<WorkQueue>,
}

impl Dispatcher {
    /// Create a dispatcher, scanning the test directory once
    pub fn new(config: DispatcherConfig) -> Result<Self> {
        let queue = WorkQueue::from_dir(&config.tests_dir, &config.pattern)?;
        println!(
            "Queued {} test scripts from {}",
            queue.len(),
            config.tests_dir.display()
        );

        Ok(Self {
            config,
            queue: Arc::new(queue),
        })
    }

    /// Run the dispatcher
    ///
    /// Publishes the discovery record, then accepts connections until
    /// interrupted (Ctrl-C) and waits for all active sessions to finish
    /// before returning. Workers still polling an empty queue are simply cut
    /// off; there is no termination broadcast.
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(("0.0.0.0", self.config.port))
            .await
            .with_context(|| format!("Failed to bind dispatcher on port {}", self.config.port))?;

        let host = match &self.config.host {
            Some(host) => host.clone(),
            None => advertised_hostname(),
        };
        let record = DiscoveryRecord::new(host, self.config.port);
        record.publish(&self.config.discovery_file)?;

        println!("Dispatcher listening on port {}", self.config.port);
        println!(
            "Discovery record: {} ({})",
            self.config.discovery_file.display(),
            record.address()
        );
        println!("Awaiting worker connections");
        println!("Press ^C to exit");

        let mut sessions = JoinSet::new();
        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            println!("[+] Worker connected: {}", peer);
                            let queue = self.queue.clone();
                            sessions.spawn(handle_session(stream, peer, queue));
                        }
                        Err(e) => {
                            // Accept faults are session-scoped; keep serving
                            eprintln!("Failed to accept connection: {}", e);
                        }
                    }
                }
                Some(_) = sessions.join_next() => {
                    // Reap finished sessions as they close
                }
                _ = tokio::signal::ctrl_c() => {
                    println!();
                    println!("Dispatcher shutting down ({} active sessions)", sessions.len());
                    break;
                }
            }
        }

        // Drain active sessions before returning
        while sessions.join_next().await.is_some() {}
        println!("Dispatcher stopped");

        Ok(())
    }
}

/// Run one worker session to completion, logging its outcome
pub async fn handle_session(mut stream: TcpStream, peer: SocketAddr, queue: Arc<WorkQueue>) {
    match session_loop(&mut stream, &queue).await {
        Ok(()) => println!("[-] Worker disconnected: {}", peer),
        Err(e) => eprintln!("[-] Session {} ended: {:#}", peer, e),
    }
}

/// Request/response loop for one connection
///
/// Returns `Ok` when the worker sends the `quit` token; any I/O or protocol
/// error terminates just this session.
async fn session_loop(stream: &mut TcpStream, queue: &WorkQueue) -> Result<()> {
    loop {
        let request = read_frame(stream).await?;
        if request == TOKEN_QUIT.as_bytes() {
            return Ok(());
        }

        // Request content is otherwise irrelevant; only queue state decides
        let response = match queue.next_item() {
            Dispatch::Item(path) => Response::Item(path),
            Dispatch::Wait => Response::Wait,
        };
        write_frame(stream, response.payload().as_bytes()).await?;
    }
}

/// Hostname advertised in the discovery record when --host is not given
fn advertised_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "localhost".to_string())
}
