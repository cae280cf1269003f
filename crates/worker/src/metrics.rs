use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::registry::WorkerId;

/// Lifecycle state of a worker thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    /// Executing tasks.
    Running,
    /// Shutdown requested, the loop is draining or discarding.
    ShuttingDown,
    /// The thread has left its loop.
    Terminated,
}

impl WorkerState {
    pub(crate) fn as_u8(self) -> u8 {
        match self {
            WorkerState::Running => 0,
            WorkerState::ShuttingDown => 1,
            WorkerState::Terminated => 2,
        }
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => WorkerState::Running,
            1 => WorkerState::ShuttingDown,
            _ => WorkerState::Terminated,
        }
    }
}

/// Per-worker counters. All monotonically increasing.
#[derive(Debug, Default)]
pub(crate) struct WorkerCounters {
    submitted: AtomicU64,
    completed: AtomicU64,
    dropped: AtomicU64,
    failed: AtomicU64,
    registered: AtomicU64,
}

impl WorkerCounters {
    pub(crate) fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn record_dropped(&self, count: u64) {
        if count > 0 {
            self.dropped.fetch_add(count, Ordering::AcqRel);
        }
    }

    pub(crate) fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Bump the external bookkeeping counter and return its new value.
    pub(crate) fn register(&self) -> u64 {
        self.registered.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Acquire)
    }

    pub(crate) fn completed(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }

    pub(crate) fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Acquire)
    }

    pub(crate) fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub(crate) fn registered(&self) -> u64 {
        self.registered.load(Ordering::Relaxed)
    }
}

/// Point-in-time diagnostic view of a worker. Not authoritative state.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerSnapshot {
    pub id: WorkerId,
    pub thread_name: String,
    pub state: WorkerState,
    /// Tasks waiting in the bounded normal queue.
    pub normal_queue_len: usize,
    /// Tasks waiting in the priority queue.
    pub priority_queue_len: usize,
    pub capacity: usize,
    /// `None` when the priority queue is unbounded.
    pub priority_capacity: Option<usize>,
    pub submitted: u64,
    pub completed: u64,
    /// Submissions discarded by backpressure or shutdown.
    pub dropped: u64,
    /// Tasks that panicked (also counted as completed).
    pub failed: u64,
    pub registered: u64,
    pub taken_at: DateTime<Utc>,
}

impl WorkerSnapshot {
    /// Total tasks queued across both tiers.
    pub fn pending(&self) -> usize {
        self.normal_queue_len + self.priority_queue_len
    }

    /// Submissions neither completed nor dropped yet.
    pub fn outstanding(&self) -> u64 {
        self.submitted
            .saturating_sub(self.completed)
            .saturating_sub(self.dropped)
    }
}

impl fmt::Display for WorkerSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Worker #{} > threadName: {}", self.id, self.thread_name)?;
        writeln!(f, "  state: {:?}", self.state)?;
        writeln!(
            f,
            "  taskQueueSize: {}/{}",
            self.normal_queue_len, self.capacity
        )?;
        match self.priority_capacity {
            Some(cap) => writeln!(f, "  priorityQueueSize: {}/{}", self.priority_queue_len, cap)?,
            None => writeln!(f, "  priorityQueueSize: {}", self.priority_queue_len)?,
        }
        writeln!(f, "  submitTaskCount: {}", self.submitted)?;
        writeln!(f, "  completeTaskCount: {}", self.completed)?;
        writeln!(f, "  droppedTaskCount: {}", self.dropped)?;
        writeln!(f, "  failedTaskCount: {}", self.failed)?;
        write!(f, "  regCnt: {}", self.registered)
    }
}
