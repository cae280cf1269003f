//! Fixed-size group of workers behind a chooser.

use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::config::FrogConfig;
use crate::error::WorkerError;
use crate::metrics::WorkerSnapshot;
use crate::select::{
    ChooserStrategyFactory, DefaultChooserFactory, EventLoopChooser, SelectStrategy, WorkerArray,
};
use crate::worker::{ShutdownMode, Worker};

/// Immutable array of workers plus the chooser that spreads load across it.
///
/// The array is sized once at construction; workers are never added or
/// removed afterwards.
pub struct WorkerGroup {
    workers: WorkerArray,
    chooser: Box<dyn EventLoopChooser>,
}

impl WorkerGroup {
    /// Spawn `config.group.resolved_size()` workers named `{prefix}-{i}`
    /// and bind them with the configured strategy.
    pub fn new(config: &FrogConfig) -> Result<Self, WorkerError> {
        config.validate()?;
        let size = config.group.resolved_size();
        let prefix = &config.group.name_prefix;

        let workers = (0..size)
            .map(|i| Worker::with_config(prefix, Some(i), &config.worker).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;

        let group = Self::from_workers(workers, config.group.strategy)?;
        info!(
            prefix = %prefix,
            size,
            strategy = %group.strategy(),
            "worker group started"
        );
        Ok(group)
    }

    /// Wrap existing workers using the default factory.
    pub fn from_workers(
        workers: Vec<Arc<Worker>>,
        strategy: SelectStrategy,
    ) -> Result<Self, WorkerError> {
        Self::with_factory(workers, strategy, &DefaultChooserFactory)
    }

    /// Wrap existing workers using a custom chooser factory.
    pub fn with_factory(
        workers: Vec<Arc<Worker>>,
        strategy: SelectStrategy,
        factory: &dyn ChooserStrategyFactory,
    ) -> Result<Self, WorkerError> {
        let workers: WorkerArray = workers.into();
        let chooser = factory.new_chooser_with(Arc::clone(&workers), strategy)?;
        Ok(Self { workers, chooser })
    }

    /// Worker picked by the group's strategy.
    pub fn next(&self) -> &Arc<Worker> {
        self.chooser.next()
    }

    /// Sticky worker for `key`: the same key always maps to the same worker.
    pub fn worker_for(&self, key: u64) -> &Arc<Worker> {
        // Lossless: the remainder is < len, which is a usize.
        let idx = (key % self.workers.len() as u64) as usize;
        &self.workers[idx]
    }

    /// Submit a normal task to the next worker.
    pub fn submit<F>(&self, task: F) -> Result<(), WorkerError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.next().submit(task)
    }

    /// Submit a priority task to the next worker.
    pub fn submit_priority<F>(&self, task: F) -> Result<(), WorkerError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.next().submit_priority(task)
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    /// Always false for a constructed group; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub fn workers(&self) -> &[Arc<Worker>] {
        &self.workers
    }

    pub fn strategy(&self) -> SelectStrategy {
        self.chooser.strategy()
    }

    /// Snapshot of every worker, in array order.
    pub fn describe(&self) -> Vec<WorkerSnapshot> {
        self.workers.iter().map(|w| w.describe()).collect()
    }

    /// Request shutdown of every worker. Does not wait.
    pub fn shutdown(&self, mode: ShutdownMode) {
        for worker in self.workers.iter() {
            worker.shutdown(mode);
        }
    }

    /// Wait for every worker thread to exit.
    pub fn join(&self) {
        for worker in self.workers.iter() {
            worker.join();
        }
    }
}

impl fmt::Debug for WorkerGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerGroup")
            .field("strategy", &self.chooser.strategy())
            .field("workers", &self.workers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GroupConfig;

    fn config(prefix: &str, size: usize, strategy: SelectStrategy) -> FrogConfig {
        FrogConfig {
            group: GroupConfig {
                name_prefix: prefix.to_string(),
                size,
                strategy,
            },
            ..FrogConfig::default()
        }
    }

    #[test]
    fn new_names_workers_by_index() {
        let group = WorkerGroup::new(&config("grp", 3, SelectStrategy::RoundRobin)).unwrap();
        let names: Vec<_> = group.workers().iter().map(|w| w.name().to_string()).collect();
        assert_eq!(names, ["grp-0", "grp-1", "grp-2"]);
        assert_eq!(group.len(), 3);
        assert!(!group.is_empty());
    }

    #[test]
    fn zero_size_uses_available_parallelism() {
        let group = WorkerGroup::new(&config("auto", 0, SelectStrategy::RoundRobin)).unwrap();
        let expected = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        assert_eq!(group.len(), expected);
    }

    #[test]
    fn new_rejects_blank_prefix() {
        let err = WorkerGroup::new(&config("  ", 2, SelectStrategy::RoundRobin)).unwrap_err();
        assert!(matches!(err, WorkerError::InvalidConfiguration(_)));
    }

    #[test]
    fn from_workers_rejects_empty() {
        let err = WorkerGroup::from_workers(Vec::new(), SelectStrategy::RoundRobin).unwrap_err();
        assert!(matches!(err, WorkerError::InvalidConfiguration(_)));
    }

    #[test]
    fn strategy_is_reported() {
        for strategy in SelectStrategy::ALL {
            let group = WorkerGroup::new(&config("strat", 2, strategy)).unwrap();
            assert_eq!(group.strategy(), strategy);
        }
    }

    #[test]
    fn worker_for_is_sticky() {
        let group = WorkerGroup::new(&config("sticky", 4, SelectStrategy::Random)).unwrap();
        for key in [0u64, 1, 7, 42, u64::MAX] {
            let first = group.worker_for(key).id();
            assert_eq!(group.worker_for(key).id(), first);
            assert_eq!(first, group.workers()[(key % 4) as usize].id());
        }
    }

    #[test]
    fn shutdown_and_join_terminate_all() {
        let group = WorkerGroup::new(&config("stop", 2, SelectStrategy::RoundRobin)).unwrap();
        group.shutdown(ShutdownMode::Drain);
        group.join();
        assert!(group
            .describe()
            .iter()
            .all(|s| s.state == crate::metrics::WorkerState::Terminated));
    }
}
