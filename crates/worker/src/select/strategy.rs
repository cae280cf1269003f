use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WorkerError;

/// Named load-balancing policy used by a chooser to pick the next worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SelectStrategy {
    /// Rotating cursor, each worker once per cycle.
    #[default]
    RoundRobin,
    /// Uniformly random index.
    Random,
    /// Worker with the fewest queued tasks.
    LeastLoaded,
}

impl SelectStrategy {
    pub const ALL: [SelectStrategy; 3] = [
        SelectStrategy::RoundRobin,
        SelectStrategy::Random,
        SelectStrategy::LeastLoaded,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SelectStrategy::RoundRobin => "round_robin",
            SelectStrategy::Random => "random",
            SelectStrategy::LeastLoaded => "least_loaded",
        }
    }
}

impl fmt::Display for SelectStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectStrategy {
    type Err = WorkerError;

    /// Accepts snake_case or kebab-case names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "round_robin" | "roundrobin" => Ok(SelectStrategy::RoundRobin),
            "random" => Ok(SelectStrategy::Random),
            "least_loaded" | "leastloaded" => Ok(SelectStrategy::LeastLoaded),
            _ => Err(WorkerError::UnsupportedStrategy(s.to_string())),
        }
    }
}

impl TryFrom<String> for SelectStrategy {
    type Error = WorkerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SelectStrategy> for String {
    fn from(strategy: SelectStrategy) -> Self {
        strategy.as_str().to_string()
    }
}
