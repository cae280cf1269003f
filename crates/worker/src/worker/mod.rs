//! Thread-confined worker with a priority tier and a bounded normal tier.
//!
//! Every [`Worker`] owns exactly one OS thread. Producers on any thread
//! enqueue tasks; only the owning thread dequeues and runs them, so the
//! tasks of one worker never run concurrently. Each loop iteration drains
//! the priority queue to empty, then runs a single normal task.
//!
//! Split into focused submodules:
//! - `core`: Worker struct, construction, introspection and lifecycle
//! - `submit`: producer-side enqueue and overflow policies
//! - `execution`: the loop run by the worker thread

mod core;
mod execution;
mod submit;

pub use self::core::{ShutdownMode, Worker};
