//! Worker and group configuration.
//!
//! Parsed from TOML with environment variable overrides, then validated:
//! - `types`: config structs, overflow policy and serde defaults
//! - `loading`: TOML/file/env loading and `FROG_*` overrides
//! - `validation`: range checks applied before any thread is spawned

mod loading;
mod types;
mod validation;

pub use types::{
    FrogConfig, GroupConfig, OverflowPolicy, WorkerConfig, DEFAULT_BLOCK_TIMEOUT_MS,
    DEFAULT_CAPACITY, MAX_CAPACITY,
};
