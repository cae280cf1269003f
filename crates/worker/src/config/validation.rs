use crate::error::WorkerError;

use super::types::{FrogConfig, GroupConfig, OverflowPolicy, WorkerConfig, MAX_CAPACITY};

impl FrogConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), WorkerError> {
        self.group.validate()?;
        self.worker.validate()?;
        Ok(())
    }
}

impl GroupConfig {
    pub fn validate(&self) -> Result<(), WorkerError> {
        if self.name_prefix.trim().is_empty() {
            return Err(WorkerError::InvalidConfiguration(
                "group name_prefix must not be empty".into(),
            ));
        }
        Ok(())
    }
}

impl WorkerConfig {
    /// Capacities must lie in `1..=MAX_CAPACITY`, blocking needs a non-zero timeout.
    pub fn validate(&self) -> Result<(), WorkerError> {
        if self.capacity == 0 {
            return Err(WorkerError::InvalidConfiguration(
                "worker capacity must be greater than zero".into(),
            ));
        }
        if self.capacity > MAX_CAPACITY {
            return Err(WorkerError::InvalidConfiguration(format!(
                "worker capacity {} exceeds the maximum of {MAX_CAPACITY}",
                self.capacity
            )));
        }
        match self.priority_capacity {
            Some(0) => {
                return Err(WorkerError::InvalidConfiguration(
                    "worker priority_capacity must be greater than zero when set".into(),
                ));
            }
            Some(cap) if cap > MAX_CAPACITY => {
                return Err(WorkerError::InvalidConfiguration(format!(
                    "worker priority_capacity {cap} exceeds the maximum of {MAX_CAPACITY}"
                )));
            }
            _ => {}
        }
        if let OverflowPolicy::BlockWithTimeout { timeout_ms: 0 } = self.overflow {
            return Err(WorkerError::InvalidConfiguration(
                "block_with_timeout overflow needs a non-zero timeout_ms".into(),
            ));
        }
        Ok(())
    }
}
