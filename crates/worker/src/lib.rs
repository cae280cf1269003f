pub mod config;
pub mod error;
pub mod group;
pub mod metrics;
mod queue;
pub mod registry;
pub mod select;
pub mod task;
pub mod worker;

pub use config::{FrogConfig, GroupConfig, OverflowPolicy, WorkerConfig, MAX_CAPACITY};
pub use error::{Tier, WorkerError};
pub use group::WorkerGroup;
pub use metrics::{WorkerSnapshot, WorkerState};
pub use registry::WorkerId;
pub use select::{
    ChooserStrategyFactory, DefaultChooserFactory, EventLoopChooser, SelectStrategy, WorkerArray,
};
pub use task::Task;
pub use worker::{ShutdownMode, Worker};
