use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::select::SelectStrategy;

/// Default bound of the normal queue.
pub const DEFAULT_CAPACITY: usize = 1 << 14;

/// Largest accepted queue bound. Bounded queues allocate every slot up front.
pub const MAX_CAPACITY: usize = 1 << 24;

/// Timeout used when `BlockWithTimeout` is selected without an explicit value.
pub const DEFAULT_BLOCK_TIMEOUT_MS: u64 = 100;

// ── Top-level config ────────────────────────────────────────────────

/// Full configuration: the group layout and the per-worker settings every
/// member of the group shares.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrogConfig {
    #[serde(default)]
    pub group: GroupConfig,

    #[serde(default)]
    pub worker: WorkerConfig,
}

// ── Section configs ─────────────────────────────────────────────────

/// What a worker does when a queue is full.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Discard the new task, log it, return normally to the producer.
    #[default]
    DropNewest,
    /// Retry until space frees up or the timeout elapses, then reject.
    BlockWithTimeout { timeout_ms: u64 },
    /// Discard the new task and return an error to the producer.
    Reject,
}

impl OverflowPolicy {
    /// Producer wait budget, only for `BlockWithTimeout`.
    pub fn timeout(&self) -> Option<Duration> {
        match self {
            OverflowPolicy::BlockWithTimeout { timeout_ms } => Some(Duration::from_millis(*timeout_ms)),
            _ => None,
        }
    }
}

/// Per-worker queue settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Bound of the normal queue. Must be > 0.
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Optional bound of the priority queue. Unbounded when absent.
    #[serde(default)]
    pub priority_capacity: Option<usize>,

    /// Overflow handling for both queues.
    #[serde(default)]
    pub overflow: OverflowPolicy,
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            priority_capacity: None,
            overflow: OverflowPolicy::default(),
        }
    }
}

impl WorkerConfig {
    /// Config with the given normal-queue capacity and defaults elsewhere.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }
}

/// Worker group layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Thread name prefix; workers are named `{prefix}-{index}`.
    #[serde(default = "default_name_prefix")]
    pub name_prefix: String,

    /// Number of workers. 0 = available parallelism.
    #[serde(default)]
    pub size: usize,

    /// Selection strategy for `WorkerGroup::next`.
    #[serde(default)]
    pub strategy: SelectStrategy,
}

fn default_name_prefix() -> String {
    "worker".into()
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            name_prefix: default_name_prefix(),
            size: 0,
            strategy: SelectStrategy::default(),
        }
    }
}

impl GroupConfig {
    /// Resolve the group size (0 means use available parallelism).
    pub fn resolved_size(&self) -> usize {
        if self.size == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        } else {
            self.size
        }
    }
}
