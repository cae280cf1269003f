use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rand::Rng;

use crate::worker::Worker;

use super::strategy::SelectStrategy;

/// Advance `cursor` by one modulo `len`, returning the slot it pointed at.
///
/// The cursor stays in `0..len`, so the cycle never skips when it would
/// otherwise wrap around `usize::MAX`.
fn advance(cursor: &AtomicUsize, len: usize) -> usize {
    cursor
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |c| Some((c + 1) % len))
        .unwrap_or_else(|c| c)
}

/// Immutable, shared array of workers a chooser selects from.
pub type WorkerArray = Arc<[Arc<Worker>]>;

/// Stateful selector bound to one worker array.
///
/// `next()` always returns a worker; implementations are built only over
/// non-empty arrays (enforced by the factory).
pub trait EventLoopChooser: Send + Sync {
    /// Pick the worker for the next submission.
    fn next(&self) -> &Arc<Worker>;

    /// The strategy this chooser implements.
    fn strategy(&self) -> SelectStrategy;
}

// ── Round robin ──────────────────────────────────────────────────────

/// Cycles through the workers in array order, wrapping around.
pub struct RoundRobinChooser {
    workers: WorkerArray,
    cursor: AtomicUsize,
}

impl RoundRobinChooser {
    pub(crate) fn new(workers: WorkerArray) -> Self {
        Self {
            workers,
            cursor: AtomicUsize::new(0),
        }
    }
}

impl EventLoopChooser for RoundRobinChooser {
    fn next(&self) -> &Arc<Worker> {
        let idx = advance(&self.cursor, self.workers.len());
        &self.workers[idx]
    }

    fn strategy(&self) -> SelectStrategy {
        SelectStrategy::RoundRobin
    }
}

// ── Random ───────────────────────────────────────────────────────────

/// Picks a uniformly random worker on every call.
pub struct RandomChooser {
    workers: WorkerArray,
}

impl RandomChooser {
    pub(crate) fn new(workers: WorkerArray) -> Self {
        Self { workers }
    }
}

impl EventLoopChooser for RandomChooser {
    fn next(&self) -> &Arc<Worker> {
        let idx = rand::thread_rng().gen_range(0..self.workers.len());
        &self.workers[idx]
    }

    fn strategy(&self) -> SelectStrategy {
        SelectStrategy::Random
    }
}

// ── Least loaded ─────────────────────────────────────────────────────

/// Picks the worker with the fewest queued tasks.
///
/// The scan starts at a rotating offset so ties spread across the array
/// instead of always landing on the first worker.
pub struct LeastLoadedChooser {
    workers: WorkerArray,
    cursor: AtomicUsize,
}

impl LeastLoadedChooser {
    pub(crate) fn new(workers: WorkerArray) -> Self {
        Self {
            workers,
            cursor: AtomicUsize::new(0),
        }
    }
}

impl EventLoopChooser for LeastLoadedChooser {
    fn next(&self) -> &Arc<Worker> {
        let len = self.workers.len();
        let start = advance(&self.cursor, len);

        let mut best = start;
        let mut best_pending = self.workers[start].pending();
        for offset in 1..len {
            if best_pending == 0 {
                break;
            }
            let idx = (start + offset) % len;
            let pending = self.workers[idx].pending();
            if pending < best_pending {
                best = idx;
                best_pending = pending;
            }
        }
        &self.workers[best]
    }

    fn strategy(&self) -> SelectStrategy {
        SelectStrategy::LeastLoaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_keeps_cursor_below_len() {
        let cursor = AtomicUsize::new(0);
        let picked: Vec<_> = (0..10).map(|_| advance(&cursor, 3)).collect();
        assert_eq!(picked, [0, 1, 2, 0, 1, 2, 0, 1, 2, 0]);
        assert_eq!(cursor.load(Ordering::Relaxed), 10 % 3);
    }

    #[test]
    fn advance_wraps_at_last_slot_without_overflow() {
        let cursor = AtomicUsize::new(4);
        assert_eq!(advance(&cursor, 5), 4);
        assert_eq!(advance(&cursor, 5), 0);
        assert_eq!(cursor.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn round_robin_cursor_stays_reduced() {
        let workers: WorkerArray = (0..3)
            .map(|i| Arc::new(Worker::with_index("rr-cursor", i).unwrap()))
            .collect::<Vec<_>>()
            .into();
        let chooser = RoundRobinChooser::new(Arc::clone(&workers));
        for _ in 0..1_000 {
            chooser.next();
        }
        assert!(chooser.cursor.load(Ordering::Relaxed) < 3);
        assert_eq!(chooser.next().id(), workers[1_000 % 3].id());
    }
}
