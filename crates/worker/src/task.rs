//! Units of work and panic-isolated execution.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// A unit of work with no arguments and no result.
///
/// Ownership moves into the worker on submission; the box is dropped after
/// execution or when the submission is discarded.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Outcome of running a single task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TaskOutcome {
    Completed,
    /// The task panicked; carries the panic message.
    Panicked(String),
}

/// Run a task, catching any panic it raises.
pub(crate) fn run_task(task: Task) -> TaskOutcome {
    match panic::catch_unwind(AssertUnwindSafe(task)) {
        Ok(()) => TaskOutcome::Completed,
        Err(payload) => TaskOutcome::Panicked(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
