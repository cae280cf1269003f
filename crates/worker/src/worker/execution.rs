use std::thread;

use tracing::{debug, error, info, warn};

use crate::metrics::WorkerState;
use crate::task::{run_task, Task, TaskOutcome};

use super::core::{Shared, ShutdownMode};

impl Shared {
    /// Body of the worker thread.
    ///
    /// Each iteration:
    /// 1. Leave the loop if shutdown was requested
    /// 2. Drain the priority queue until it reports empty
    /// 3. Run exactly one normal task, or park until a producer wakes us
    pub(super) fn run_loop(&self) {
        debug!(worker = %self.name, id = %self.id, "worker loop started");

        let mode = loop {
            if let Some(mode) = self.shutdown_mode() {
                break mode;
            }

            self.drain_priority();

            if let Some(task) = self.normal.pop() {
                self.execute(task);
            } else if self.priority.is_empty() && self.shutdown_mode().is_none() {
                // Producers unpark after every push; an unpark that lands
                // before this call makes it return immediately.
                thread::park();
            }
        };

        self.finish(mode);
    }

    /// Run every queued priority task, oldest first.
    fn drain_priority(&self) {
        while let Some(task) = self.priority.pop() {
            self.execute(task);
        }
    }

    /// Run one task. Panics are contained here; the task still counts as
    /// completed.
    fn execute(&self, task: Task) {
        if let TaskOutcome::Panicked(message) = run_task(task) {
            self.counters.record_failed();
            error!(worker = %self.name, panic = %message, "task panicked");
        }
        self.counters.record_completed();
    }

    fn finish(&self, mode: ShutdownMode) {
        info!(worker = %self.name, ?mode, pending = self.pending(), "worker stopping");
        self.settle(mode);
        self.close();
        // A producer may have pushed between its shutdown check and close().
        self.settle(self.shutdown_mode().unwrap_or(mode));
        self.set_state(WorkerState::Terminated);
        info!(
            worker = %self.name,
            completed = self.counters.completed(),
            dropped = self.counters.dropped(),
            "worker terminated"
        );
    }

    /// Empty both queues: run the tasks in tier order (`Drain`) or drop them
    /// (`Discard`).
    pub(super) fn settle(&self, mode: ShutdownMode) {
        match mode {
            ShutdownMode::Drain => loop {
                if self.shutdown_mode() == Some(ShutdownMode::Discard) {
                    return self.settle(ShutdownMode::Discard);
                }
                self.drain_priority();
                match self.normal.pop() {
                    Some(task) => self.execute(task),
                    None if self.priority.is_empty() => break,
                    None => {}
                }
            },
            ShutdownMode::Discard => {
                let discarded = self.priority.clear() + self.normal.clear();
                if discarded > 0 {
                    self.counters.record_dropped(discarded as u64);
                    warn!(worker = %self.name, discarded, "discarded pending tasks");
                }
            }
        }
    }
}
