use std::thread;
use std::time::{Duration, Instant};

use crossbeam_utils::Backoff;
use tracing::{error, warn};

use crate::config::OverflowPolicy;
use crate::error::{Tier, WorkerError};
use crate::task::Task;

use super::core::{ShutdownMode, Worker};

/// Sleep between retries once spinning has backed off completely.
const BLOCK_POLL_INTERVAL: Duration = Duration::from_micros(200);

impl Worker {
    /// Enqueue a task on the bounded normal tier.
    ///
    /// Never blocks unless the overflow policy is `BlockWithTimeout`. Under
    /// the default `DropNewest` policy a full queue drops the task, logs it
    /// and still returns `Ok(())`.
    pub fn submit<F>(&self, task: F) -> Result<(), WorkerError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.enqueue(Tier::Normal, Box::new(task))
    }

    /// Enqueue a task on the priority tier. Priority tasks queued before a
    /// loop iteration all run before that iteration's normal task.
    pub fn submit_priority<F>(&self, task: F) -> Result<(), WorkerError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.enqueue(Tier::Priority, Box::new(task))
    }

    /// Enqueue an already boxed task on the given tier.
    pub fn submit_task(&self, tier: Tier, task: Task) -> Result<(), WorkerError> {
        self.enqueue(tier, task)
    }

    fn enqueue(&self, tier: Tier, task: Task) -> Result<(), WorkerError> {
        let shared = &self.shared;
        // Counted before the push so completed never overtakes submitted.
        shared.counters.record_submitted();

        if shared.shutdown_mode().is_some() {
            shared.counters.record_dropped(1);
            warn!(worker = %shared.name, %tier, "task submitted after shutdown, dropped");
            return Err(WorkerError::ShutDown(shared.name.clone()));
        }

        match shared.queue(tier).push(task) {
            Ok(()) => {
                self.accepted();
                Ok(())
            }
            Err(task) => self.overflow(tier, task),
        }
    }

    /// Wake the worker after a successful push.
    fn accepted(&self) {
        self.thread.unpark();
        // The loop already exited: nothing will ever run what we just queued.
        if self.shared.is_closed() {
            self.shared.settle(ShutdownMode::Discard);
        }
    }

    fn overflow(&self, tier: Tier, task: Task) -> Result<(), WorkerError> {
        if let Some(timeout) = self.shared.overflow.timeout() {
            return self.block_until_space(tier, task, timeout);
        }
        self.drop_task(tier, task);
        match self.shared.overflow {
            OverflowPolicy::Reject => Err(self.rejected(tier)),
            _ => Ok(()),
        }
    }

    /// Retry the push until it succeeds, the timeout elapses or the worker
    /// shuts down.
    fn block_until_space(
        &self,
        tier: Tier,
        mut task: Task,
        timeout: Duration,
    ) -> Result<(), WorkerError> {
        // Only the worker thread frees space, so waiting on it from itself
        // can only time out.
        if self.is_current() {
            self.drop_task(tier, task);
            return Err(self.rejected(tier));
        }

        let deadline = Instant::now() + timeout;
        let backoff = Backoff::new();
        loop {
            self.thread.unpark();
            if backoff.is_completed() {
                thread::sleep(BLOCK_POLL_INTERVAL);
            } else {
                backoff.snooze();
            }

            task = match self.shared.queue(tier).push(task) {
                Ok(()) => {
                    self.accepted();
                    return Ok(());
                }
                Err(task) => task,
            };

            if self.shared.shutdown_mode().is_some() {
                drop(task);
                self.shared.counters.record_dropped(1);
                return Err(WorkerError::ShutDown(self.shared.name.clone()));
            }
            if Instant::now() >= deadline {
                self.drop_task(tier, task);
                return Err(self.rejected(tier));
            }
        }
    }

    fn drop_task(&self, tier: Tier, task: Task) {
        drop(task);
        self.shared.counters.record_dropped(1);
        let producer = thread::current();
        error!(
            worker = %self.shared.name,
            producer = producer.name().unwrap_or("<unnamed>"),
            %tier,
            "task queue full, task dropped"
        );
    }

    fn rejected(&self, tier: Tier) -> WorkerError {
        WorkerError::SubmissionRejected {
            worker: self.shared.name.clone(),
            tier,
        }
    }
}
