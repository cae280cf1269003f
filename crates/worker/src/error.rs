use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Queue tier a task is submitted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Drained to exhaustion before every normal task.
    Priority,
    /// Bounded FIFO, one task per loop iteration.
    Normal,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Priority => f.write_str("priority"),
            Tier::Normal => f.write_str("normal"),
        }
    }
}

/// Errors surfaced by workers, choosers and configuration loading.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("unsupported select strategy: {0}")]
    UnsupportedStrategy(String),

    #[error("{tier} task rejected by worker '{worker}': queue full")]
    SubmissionRejected { worker: String, tier: Tier },

    #[error("worker '{0}' is shut down")]
    ShutDown(String),

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config I/O error: {0}")]
    ConfigIo(#[source] std::io::Error),
}
