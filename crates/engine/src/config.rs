// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration
//!
//! Loaded once at startup and shared as `Arc<EngineConfig>`; workers read it
//! when they are constructed and never observe changes afterwards.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub query_cache: QueryCacheConfig,
    pub apply: ApplyConfig,
}

/// Per-worker plan cache shape
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueryCacheConfig {
    pub enabled: bool,
    /// Number of blocks; rounded up to a power of two
    pub blocks: usize,
    /// Slots per block; rounded up to a power of two
    pub rows: usize,
}

impl Default for QueryCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            blocks: 4,
            rows: 16,
        }
    }
}

impl QueryCacheConfig {
    /// A disabled cache still exists, shrunk to a single slot
    pub fn dimensions(&self) -> (usize, usize) {
        if self.enabled {
            (self.blocks, self.rows)
        } else {
            (1, 1)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApplyConfig {
    /// Apply workers started by the scheduler
    pub workers: usize,
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self { workers: 2 }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.query_cache.blocks == 0 || self.query_cache.rows == 0 {
            return Err(ConfigError::Invalid(
                "query_cache.blocks and query_cache.rows must be positive".to_string(),
            ));
        }
        if self.apply.workers == 0 {
            return Err(ConfigError::Invalid(
                "apply.workers must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
