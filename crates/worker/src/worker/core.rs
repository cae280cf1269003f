use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle, Thread};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::{OverflowPolicy, WorkerConfig};
use crate::error::{Tier, WorkerError};
use crate::metrics::{WorkerCounters, WorkerSnapshot, WorkerState};
use crate::queue::TaskQueue;
use crate::registry::{next_worker_id, WorkerId};

/// What happens to queued tasks when a worker stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShutdownMode {
    /// Run everything already queued, in tier order, then exit.
    Drain,
    /// Drop everything queued (counted as dropped), then exit.
    Discard,
}

impl ShutdownMode {
    // 0 is reserved for "no shutdown requested"; Discard > Drain so a
    // later Discard request escalates an in-progress drain.
    pub(super) fn as_u8(self) -> u8 {
        match self {
            ShutdownMode::Drain => 1,
            ShutdownMode::Discard => 2,
        }
    }

    pub(super) fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(ShutdownMode::Drain),
            2 => Some(ShutdownMode::Discard),
            _ => None,
        }
    }
}

/// State shared between the worker handle and its thread.
pub(super) struct Shared {
    pub(super) id: WorkerId,
    pub(super) name: String,
    pub(super) priority: TaskQueue,
    pub(super) normal: TaskQueue,
    pub(super) overflow: OverflowPolicy,
    pub(super) counters: WorkerCounters,
    state: AtomicU8,
    shutdown: AtomicU8,
    /// Set once the loop has settled its queues for the last time.
    closed: AtomicBool,
}

impl Shared {
    pub(super) fn queue(&self, tier: Tier) -> &TaskQueue {
        match tier {
            Tier::Priority => &self.priority,
            Tier::Normal => &self.normal,
        }
    }

    pub(super) fn shutdown_mode(&self) -> Option<ShutdownMode> {
        ShutdownMode::from_u8(self.shutdown.load(Ordering::SeqCst))
    }

    /// Record a shutdown request. Returns true if it changed the mode.
    pub(super) fn request_shutdown(&self, mode: ShutdownMode) -> bool {
        let previous = self.shutdown.fetch_max(mode.as_u8(), Ordering::SeqCst);
        let _ = self.state.compare_exchange(
            WorkerState::Running.as_u8(),
            WorkerState::ShuttingDown.as_u8(),
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
        previous < mode.as_u8()
    }

    pub(super) fn state(&self) -> WorkerState {
        WorkerState::from_u8(self.state.load(Ordering::SeqCst))
    }

    pub(super) fn set_state(&self, state: WorkerState) {
        self.state.store(state.as_u8(), Ordering::SeqCst);
    }

    pub(super) fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub(super) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub(super) fn pending(&self) -> usize {
        self.priority.len() + self.normal.len()
    }
}

/// A named executor owning one dedicated thread and two task queues.
///
/// Construction spawns the thread; it runs until [`Worker::shutdown`] is
/// called or the handle is dropped.
pub struct Worker {
    pub(super) shared: Arc<Shared>,
    pub(super) thread: Thread,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Worker {
    /// Worker named after `prefix` with default settings.
    pub fn new(prefix: &str) -> Result<Self, WorkerError> {
        Self::with_config(prefix, None, &WorkerConfig::default())
    }

    /// Worker named `{prefix}-{index}` with default settings.
    pub fn with_index(prefix: &str, index: usize) -> Result<Self, WorkerError> {
        Self::with_config(prefix, Some(index), &WorkerConfig::default())
    }

    /// Validate `config`, allocate an id and spawn the worker thread.
    ///
    /// The thread is named `{prefix}-{index}` when an index is given and
    /// `{prefix}` otherwise.
    pub fn with_config(
        prefix: &str,
        index: Option<usize>,
        config: &WorkerConfig,
    ) -> Result<Self, WorkerError> {
        config.validate()?;
        if prefix.trim().is_empty() {
            return Err(WorkerError::InvalidConfiguration(
                "worker name prefix must not be empty".into(),
            ));
        }

        let name = thread_name(prefix, index);
        let shared = Arc::new(Shared {
            id: next_worker_id(),
            name: name.clone(),
            priority: TaskQueue::with_capacity(config.priority_capacity),
            normal: TaskQueue::bounded(config.capacity),
            overflow: config.overflow,
            counters: WorkerCounters::default(),
            state: AtomicU8::new(WorkerState::Running.as_u8()),
            shutdown: AtomicU8::new(0),
            closed: AtomicBool::new(false),
        });

        let loop_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || loop_shared.run_loop())
            .map_err(WorkerError::Spawn)?;
        let thread = handle.thread().clone();

        debug!(
            worker = %name,
            id = %shared.id,
            capacity = config.capacity,
            priority_capacity = ?config.priority_capacity,
            "worker started"
        );

        Ok(Self {
            shared,
            thread,
            handle: Mutex::new(Some(handle)),
        })
    }

    pub fn id(&self) -> WorkerId {
        self.shared.id
    }

    /// Thread name of this worker.
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn state(&self) -> WorkerState {
        self.shared.state()
    }

    pub fn overflow_policy(&self) -> OverflowPolicy {
        self.shared.overflow
    }

    /// Tasks queued across both tiers.
    pub fn pending(&self) -> usize {
        self.shared.pending()
    }

    /// Whether the calling thread is this worker's own thread.
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.thread.id()
    }

    /// Bump the bookkeeping counter reserved for callers (e.g. the number of
    /// sessions bound to this worker). Returns the new value.
    pub fn register(&self) -> u64 {
        self.shared.counters.register()
    }

    /// Diagnostic snapshot of queue sizes and counters.
    pub fn describe(&self) -> WorkerSnapshot {
        let s = &self.shared;
        // Completed before submitted so the snapshot never shows completed > submitted.
        let completed = s.counters.completed();
        let dropped = s.counters.dropped();
        let submitted = s.counters.submitted();

        WorkerSnapshot {
            id: s.id,
            thread_name: s.name.clone(),
            state: s.state(),
            normal_queue_len: s.normal.len(),
            priority_queue_len: s.priority.len(),
            capacity: s.normal.capacity().unwrap_or_default(),
            priority_capacity: s.priority.capacity(),
            submitted,
            completed,
            dropped,
            failed: s.counters.failed(),
            registered: s.counters.registered(),
            taken_at: Utc::now(),
        }
    }

    /// Ask the worker to stop. Idempotent; a `Discard` request overrides an
    /// earlier `Drain`. Does not wait, see [`Worker::join`].
    pub fn shutdown(&self, mode: ShutdownMode) {
        if self.shared.request_shutdown(mode) {
            info!(worker = %self.shared.name, ?mode, pending = self.pending(), "shutdown requested");
        }
        self.thread.unpark();
    }

    /// Wait for the worker thread to exit.
    ///
    /// Returns immediately when called from the worker's own thread or when
    /// the thread was already joined.
    pub fn join(&self) {
        if self.is_current() {
            return;
        }
        let handle = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                error!(worker = %self.shared.name, "worker thread panicked outside task execution");
            }
        }
    }
}

impl fmt::Debug for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.shared.id)
            .field("name", &self.shared.name)
            .field("state", &self.shared.state())
            .field("normal", &self.shared.normal)
            .field("priority", &self.shared.priority)
            .finish()
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.shared.request_shutdown(ShutdownMode::Drain);
        self.thread.unpark();
    }
}

pub(super) fn thread_name(prefix: &str, index: Option<usize>) -> String {
    match index {
        Some(index) => format!("{prefix}-{index}"),
        None => prefix.to_string(),
    }
}
