// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration
//!
//! Loaded from TOML; durations use human-readable forms such as `"30s"` or `"10m"`.
//!
//! ```toml
//! stale_operation_threshold = "10m"
//! sweep_interval = "30s"
//! cache_unused_threshold = "1h"
//! conflict_retries = 3
//! wal_path = "/var/lib/lifecycle/entities.jsonl"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors from loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Tunables for the lifecycle engine
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Pending operations older than this are cancelled by the sweeper
    #[serde(with = "humantime_serde")]
    pub stale_operation_threshold: Duration,
    /// How often the sweeper runs
    #[serde(with = "humantime_serde")]
    pub sweep_interval: Duration,
    /// Cached objects idle for longer than this may be evicted
    #[serde(with = "humantime_serde")]
    pub cache_unused_threshold: Duration,
    /// Total attempts callers make on optimistic-lock conflicts
    pub conflict_retries: u32,
    /// Write-ahead log location for the durable entity store
    pub wal_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stale_operation_threshold: Duration::from_secs(10 * 60),
            sweep_interval: Duration::from_secs(30),
            cache_unused_threshold: Duration::from_secs(60 * 60),
            conflict_retries: 3,
            wal_path: None,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn with_stale_operation_threshold(mut self, threshold: Duration) -> Self {
        self.stale_operation_threshold = threshold;
        self
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    pub fn with_cache_unused_threshold(mut self, threshold: Duration) -> Self {
        self.cache_unused_threshold = threshold;
        self
    }

    pub fn with_conflict_retries(mut self, retries: u32) -> Self {
        self.conflict_retries = retries;
        self
    }

    pub fn with_wal_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.wal_path = Some(path.into());
        self
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
