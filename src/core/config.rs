//! Pool configuration

use crate::core::error::{PoolError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Pool construction parameters
///
/// Geometry is fixed at construction: the pool holds
/// `total_size / block_size` blocks for its whole lifetime.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolConfig {
    /// Total pool capacity in bytes
    pub total_size: u64,

    /// Size of each block in bytes
    pub block_size: u64,

    /// Consecutive faults tolerated before recovery triggers
    pub escalation_threshold: u32,

    /// Directory for the JSON journal; in-memory journal when unset
    pub journal_dir: Option<PathBuf>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            total_size: 1024,
            block_size: 1,
            escalation_threshold: 3,
            journal_dir: None,
        }
    }
}

impl PoolConfig {
    /// Check geometry and threshold before a pool is built from this.
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(PoolError::Config("block size must be non-zero".into()));
        }
        if self.total_size == 0 {
            return Err(PoolError::Config("total size must be non-zero".into()));
        }
        if self.total_size % self.block_size != 0 {
            return Err(PoolError::Config(format!(
                "total size {} is not a multiple of block size {}",
                self.total_size, self.block_size
            )));
        }
        if self.escalation_threshold == 0 {
            return Err(PoolError::Config(
                "escalation threshold must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Number of blocks the pool will hold.
    pub fn block_count(&self) -> u64 {
        self.total_size / self.block_size
    }

    /// Load and validate a configuration from a TOML file.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: PoolConfig =
            toml::from_str(&text).map_err(|err| PoolError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
