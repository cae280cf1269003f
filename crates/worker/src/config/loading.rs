use std::path::Path;
use std::str::FromStr;

use tracing::info;

use crate::error::WorkerError;

use super::types::{FrogConfig, OverflowPolicy, DEFAULT_BLOCK_TIMEOUT_MS};

impl FrogConfig {
    /// Parse config from a TOML string, apply env overrides, validate.
    pub fn from_toml(toml_str: &str) -> Result<Self, WorkerError> {
        let mut config: Self = toml::from_str(toml_str)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, WorkerError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(WorkerError::ConfigIo)?;
        Self::from_toml(&content)
    }

    /// Defaults plus env overrides, for deployments without a config file.
    pub fn from_env() -> Result<Self, WorkerError> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Print a one-line summary per section for startup logs.
    pub fn log_summary(&self) {
        info!(
            prefix = %self.group.name_prefix,
            size = self.group.resolved_size(),
            strategy = %self.group.strategy,
            "group config"
        );
        info!(
            capacity = self.worker.capacity,
            priority_capacity = ?self.worker.priority_capacity,
            overflow = ?self.worker.overflow,
            "worker config"
        );
    }

    // ── Environment variable overrides ──────────────────────────────

    /// Apply environment variable overrides.
    ///
    /// Convention: `FROG_SECTION_KEY` overrides `section.key`.
    /// - `FROG_GROUP_NAME_PREFIX` → `group.name_prefix`
    /// - `FROG_GROUP_SIZE` → `group.size`
    /// - `FROG_GROUP_STRATEGY` → `group.strategy`
    /// - `FROG_WORKER_CAPACITY` → `worker.capacity`
    /// - `FROG_WORKER_PRIORITY_CAPACITY` → `worker.priority_capacity` (`unbounded` clears it)
    /// - `FROG_WORKER_OVERFLOW` → `worker.overflow` (`drop_newest`, `reject`, `block_with_timeout`)
    /// - `FROG_WORKER_BLOCK_TIMEOUT_MS` → switches `worker.overflow` to `block_with_timeout`
    fn apply_env_overrides(&mut self) -> Result<(), WorkerError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup. Malformed values are errors.
    pub(crate) fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), WorkerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("FROG_GROUP_NAME_PREFIX") {
            self.group.name_prefix = v;
        }
        if let Some(v) = get("FROG_GROUP_SIZE") {
            self.group.size = parse_number("FROG_GROUP_SIZE", &v)?;
        }
        if let Some(v) = get("FROG_GROUP_STRATEGY") {
            self.group.strategy = v.parse()?;
        }
        if let Some(v) = get("FROG_WORKER_CAPACITY") {
            self.worker.capacity = parse_number("FROG_WORKER_CAPACITY", &v)?;
        }
        if let Some(v) = get("FROG_WORKER_PRIORITY_CAPACITY") {
            self.worker.priority_capacity = if v.trim().eq_ignore_ascii_case("unbounded") {
                None
            } else {
                Some(parse_number("FROG_WORKER_PRIORITY_CAPACITY", &v)?)
            };
        }

        let timeout_ms = get("FROG_WORKER_BLOCK_TIMEOUT_MS")
            .map(|v| parse_number::<u64>("FROG_WORKER_BLOCK_TIMEOUT_MS", &v))
            .transpose()?;

        if let Some(v) = get("FROG_WORKER_OVERFLOW") {
            self.worker.overflow = parse_overflow(&v, timeout_ms)?;
        } else if let Some(timeout_ms) = timeout_ms {
            self.worker.overflow = OverflowPolicy::BlockWithTimeout { timeout_ms };
        }
        Ok(())
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T, WorkerError> {
    value.trim().parse().map_err(|_| {
        WorkerError::InvalidConfiguration(format!("{key} must be a non-negative integer, got '{value}'"))
    })
}

fn parse_overflow(value: &str, timeout_ms: Option<u64>) -> Result<OverflowPolicy, WorkerError> {
    match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
        "drop_newest" | "drop" => Ok(OverflowPolicy::DropNewest),
        "reject" => Ok(OverflowPolicy::Reject),
        "block_with_timeout" | "block" => Ok(OverflowPolicy::BlockWithTimeout {
            timeout_ms: timeout_ms.unwrap_or(DEFAULT_BLOCK_TIMEOUT_MS),
        }),
        other => Err(WorkerError::InvalidConfiguration(format!(
            "invalid overflow policy '{other}', expected 'drop_newest', 'reject' or 'block_with_timeout'"
        ))),
    }
}
