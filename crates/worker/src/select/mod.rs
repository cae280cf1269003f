//! Load balancing across a fixed array of workers.
//!
//! A [`ChooserStrategyFactory`] binds a worker array and a
//! [`SelectStrategy`] into an [`EventLoopChooser`], whose `next()` picks the
//! worker for each submission.

mod chooser;
mod factory;
mod strategy;

pub use chooser::{EventLoopChooser, LeastLoadedChooser, RandomChooser, RoundRobinChooser, WorkerArray};
pub use factory::{ChooserStrategyFactory, DefaultChooserFactory};
pub use strategy::SelectStrategy;
