//! Dispatcher side: the work queue and the server that exposes it to workers

pub mod queue;
pub mod server;

pub use queue::{Dispatch, WorkQueue};
pub use server::Dispatcher;
