//! SimSweep - distributed test-script dispatcher
//!
//! SimSweep coordinates execution of a large batch of independent test scripts
//! across a dynamically-connecting set of remote workers. A central dispatcher
//! holds the authoritative queue of remaining scripts and hands out exactly one
//! per request; workers pull a script, run it locally, and pull again.
//!
//! # Architecture
//!
//! - **Dispatcher**: owns the work queue, serves one item per request under
//!   mutual exclusion, one session task per connected worker
//! - **Worker**: sequential pull/execute loop over a persistent TCP connection
//! - **Discovery record**: two-line address file bridging dispatcher startup
//!   and worker bootstrap
//! - **Wire protocol**: length-prefixed frames carrying plain string payloads

pub mod config;
pub mod discovery;
pub mod dispatch;
pub mod protocol;
pub mod worker;

// Re-export commonly used types
pub use config::{DispatcherConfig, WorkerConfig};
pub use dispatch::{Dispatch, WorkQueue};

/// Result type used throughout SimSweep
pub type Result<T> = anyhow::Result<T>;
