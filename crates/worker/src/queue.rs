//! Lock-free task queues backing the two worker tiers.

use std::fmt;

use crossbeam_queue::{ArrayQueue, SegQueue};

use crate::task::Task;

/// A multi-producer FIFO of tasks, either bounded or unbounded.
pub(crate) enum TaskQueue {
    Bounded(ArrayQueue<Task>),
    Unbounded(SegQueue<Task>),
}

impl TaskQueue {
    /// Bounded queue. `capacity` must be non-zero (validated by config).
    pub(crate) fn bounded(capacity: usize) -> Self {
        TaskQueue::Bounded(ArrayQueue::new(capacity))
    }

    pub(crate) fn unbounded() -> Self {
        TaskQueue::Unbounded(SegQueue::new())
    }

    /// Bounded when a capacity is given, unbounded otherwise.
    pub(crate) fn with_capacity(capacity: Option<usize>) -> Self {
        match capacity {
            Some(capacity) => Self::bounded(capacity),
            None => Self::unbounded(),
        }
    }

    /// Non-blocking push. Hands the task back when the queue is full.
    pub(crate) fn push(&self, task: Task) -> Result<(), Task> {
        match self {
            TaskQueue::Bounded(q) => q.push(task),
            TaskQueue::Unbounded(q) => {
                q.push(task);
                Ok(())
            }
        }
    }

    /// Non-blocking pop of the oldest task.
    pub(crate) fn pop(&self) -> Option<Task> {
        match self {
            TaskQueue::Bounded(q) => q.pop(),
            TaskQueue::Unbounded(q) => q.pop(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            TaskQueue::Bounded(q) => q.len(),
            TaskQueue::Unbounded(q) => q.len(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        match self {
            TaskQueue::Bounded(q) => q.is_empty(),
            TaskQueue::Unbounded(q) => q.is_empty(),
        }
    }

    /// `None` for unbounded queues.
    pub(crate) fn capacity(&self) -> Option<usize> {
        match self {
            TaskQueue::Bounded(q) => Some(q.capacity()),
            TaskQueue::Unbounded(_) => None,
        }
    }

    /// Pop and drop every queued task, returning how many were discarded.
    pub(crate) fn clear(&self) -> usize {
        let mut discarded = 0;
        while self.pop().is_some() {
            discarded += 1;
        }
        discarded
    }
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}
