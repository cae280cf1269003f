//! Overflow policies and shutdown modes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use frog_worker::{
    OverflowPolicy, ShutdownMode, Tier, Worker, WorkerConfig, WorkerError, WorkerState,
};

const TIMEOUT: Duration = Duration::from_secs(10);

/// Park the worker inside a normal task until the returned sender drops.
/// The normal queue is empty once this returns.
fn gate(worker: &Worker) -> mpsc::Sender<()> {
    let (started_tx, started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    worker
        .submit(move || {
            started_tx.send(()).unwrap();
            let _ = release_rx.recv();
        })
        .unwrap();
    started_rx.recv_timeout(TIMEOUT).expect("gate task should start");
    release_tx
}

fn counting_task(counter: &Arc<AtomicUsize>) -> impl FnOnce() + Send + 'static {
    let counter = Arc::clone(counter);
    move || {
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

fn worker_with(prefix: &str, capacity: usize, overflow: OverflowPolicy) -> Worker {
    let config = WorkerConfig {
        capacity,
        overflow,
        ..WorkerConfig::default()
    };
    Worker::with_config(prefix, None, &config).unwrap()
}

// ── Overflow policies ───────────────────────────────────────────────

#[test]
fn test_drop_newest_drops_exactly_the_overflow() {
    const CAPACITY: usize = 4;
    let worker = worker_with("bp-drop", CAPACITY, OverflowPolicy::DropNewest);
    let executed = Arc::new(AtomicUsize::new(0));

    let release = gate(&worker);
    for _ in 0..=CAPACITY {
        // Dropping is silent to the producer.
        worker.submit(counting_task(&executed)).unwrap();
    }
    assert_eq!(worker.describe().dropped, 1);
    assert_eq!(worker.pending(), CAPACITY);

    drop(release);
    worker.shutdown(ShutdownMode::Drain);
    worker.join();

    let snap = worker.describe();
    assert_eq!(executed.load(Ordering::SeqCst), CAPACITY);
    assert_eq!(snap.dropped, 1);
    assert_eq!(snap.completed + snap.dropped, snap.submitted);
}

#[test]
fn test_reject_returns_error_when_full() {
    let worker = worker_with("bp-reject", 2, OverflowPolicy::Reject);

    let release = gate(&worker);
    worker.submit(|| {}).unwrap();
    worker.submit(|| {}).unwrap();
    let err = worker.submit(|| {}).unwrap_err();
    match err {
        WorkerError::SubmissionRejected { worker: name, tier } => {
            assert_eq!(name, "bp-reject");
            assert_eq!(tier, Tier::Normal);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(worker.describe().dropped, 1);
    drop(release);
}

#[test]
fn test_block_with_timeout_gives_up_after_deadline() {
    let worker = worker_with(
        "bp-timeout",
        1,
        OverflowPolicy::BlockWithTimeout { timeout_ms: 50 },
    );

    let release = gate(&worker);
    worker.submit(|| {}).unwrap();

    let started = Instant::now();
    let err = worker.submit(|| {}).unwrap_err();
    let waited = started.elapsed();

    assert!(matches!(err, WorkerError::SubmissionRejected { .. }));
    assert!(waited >= Duration::from_millis(50), "waited {waited:?}");
    assert!(waited < TIMEOUT);
    assert_eq!(worker.describe().dropped, 1);
    drop(release);
}

#[test]
fn test_block_with_timeout_succeeds_when_space_frees() {
    let worker = worker_with(
        "bp-block",
        1,
        OverflowPolicy::BlockWithTimeout { timeout_ms: 5_000 },
    );
    let executed = Arc::new(AtomicUsize::new(0));

    let release = gate(&worker);
    worker.submit(counting_task(&executed)).unwrap();

    let releaser = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        drop(release);
    });
    worker.submit(counting_task(&executed)).unwrap();
    releaser.join().unwrap();

    worker.shutdown(ShutdownMode::Drain);
    worker.join();
    assert_eq!(executed.load(Ordering::SeqCst), 2);
    assert_eq!(worker.describe().dropped, 0);
}

// ── Shutdown ────────────────────────────────────────────────────────

#[test]
fn test_drain_runs_everything_queued() {
    let worker = Worker::new("sd-drain").unwrap();
    let executed = Arc::new(AtomicUsize::new(0));

    let release = gate(&worker);
    for _ in 0..10 {
        worker.submit(counting_task(&executed)).unwrap();
    }
    worker.submit_priority(counting_task(&executed)).unwrap();
    worker.shutdown(ShutdownMode::Drain);
    assert_eq!(worker.state(), WorkerState::ShuttingDown);

    drop(release);
    worker.join();

    let snap = worker.describe();
    assert_eq!(executed.load(Ordering::SeqCst), 11);
    assert_eq!(snap.state, WorkerState::Terminated);
    assert_eq!(snap.dropped, 0);
    assert_eq!(snap.pending(), 0);
}

#[test]
fn test_discard_drops_everything_queued() {
    let worker = Worker::new("sd-discard").unwrap();
    let executed = Arc::new(AtomicUsize::new(0));

    let release = gate(&worker);
    for _ in 0..10 {
        worker.submit(counting_task(&executed)).unwrap();
    }
    worker.submit_priority(counting_task(&executed)).unwrap();
    worker.shutdown(ShutdownMode::Discard);

    drop(release);
    worker.join();

    let snap = worker.describe();
    assert_eq!(executed.load(Ordering::SeqCst), 0);
    assert_eq!(snap.dropped, 11);
    // The gate itself completed.
    assert_eq!(snap.completed, 1);
    assert_eq!(snap.completed + snap.dropped, snap.submitted);
}

#[test]
fn test_submit_after_shutdown_is_refused() {
    let worker = Worker::new("sd-late").unwrap();
    worker.shutdown(ShutdownMode::Drain);
    worker.join();

    let err = worker.submit(|| {}).unwrap_err();
    assert!(matches!(err, WorkerError::ShutDown(ref name) if name == "sd-late"));
    let err = worker.submit_priority(|| {}).unwrap_err();
    assert!(matches!(err, WorkerError::ShutDown(_)));

    let snap = worker.describe();
    assert_eq!(snap.submitted, 2);
    assert_eq!(snap.dropped, 2);
    assert_eq!(snap.completed, 0);
}

#[test]
fn test_shutdown_is_idempotent() {
    let worker = Worker::new("sd-twice").unwrap();
    worker.shutdown(ShutdownMode::Drain);
    worker.shutdown(ShutdownMode::Drain);
    worker.join();
    worker.shutdown(ShutdownMode::Discard);
    assert_eq!(worker.state(), WorkerState::Terminated);
}
