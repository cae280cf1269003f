use tracing::debug;

use crate::error::WorkerError;

use super::chooser::{
    EventLoopChooser, LeastLoadedChooser, RandomChooser, RoundRobinChooser, WorkerArray,
};
use super::strategy::SelectStrategy;

/// Builds choosers over a worker array.
pub trait ChooserStrategyFactory: Send + Sync {
    /// Strategy used by [`ChooserStrategyFactory::new_chooser`].
    fn default_strategy(&self) -> SelectStrategy {
        SelectStrategy::RoundRobin
    }

    /// Chooser using the factory's default strategy.
    fn new_chooser(&self, workers: WorkerArray) -> Result<Box<dyn EventLoopChooser>, WorkerError> {
        self.new_chooser_with(workers, self.default_strategy())
    }

    /// Chooser bound to `strategy`.
    ///
    /// Fails with `InvalidConfiguration` for an empty array and with
    /// `UnsupportedStrategy` when the factory does not implement `strategy`.
    fn new_chooser_with(
        &self,
        workers: WorkerArray,
        strategy: SelectStrategy,
    ) -> Result<Box<dyn EventLoopChooser>, WorkerError>;
}

/// Factory supporting every [`SelectStrategy`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultChooserFactory;

impl ChooserStrategyFactory for DefaultChooserFactory {
    fn new_chooser_with(
        &self,
        workers: WorkerArray,
        strategy: SelectStrategy,
    ) -> Result<Box<dyn EventLoopChooser>, WorkerError> {
        if workers.is_empty() {
            return Err(WorkerError::InvalidConfiguration(
                "cannot build a chooser over zero workers".into(),
            ));
        }
        debug!(%strategy, workers = workers.len(), "building chooser");

        Ok(match strategy {
            SelectStrategy::RoundRobin => Box::new(RoundRobinChooser::new(workers)),
            SelectStrategy::Random => Box::new(RandomChooser::new(workers)),
            SelectStrategy::LeastLoaded => Box::new(LeastLoadedChooser::new(workers)),
        })
    }
}
