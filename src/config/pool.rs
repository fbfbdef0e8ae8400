//! Connection pool configuration
//!
//! Defines the sizing and shrink parameters of a connection pool.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default maximum pool size
fn default_max_pool_size() -> usize {
    10
}

/// Default minimum pool size
fn default_min_pool_size() -> usize {
    2
}

/// Default shrink interval in seconds
fn default_shrink_interval() -> u64 {
    60
}

/// Connection pool configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Hard cap on live connections (idle + in use)
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: usize,

    /// Floor below which a shrink pass will not reduce live connections
    #[serde(default = "default_min_pool_size")]
    pub min_pool_size: usize,

    /// Seconds between shrink evaluations, 0 disables shrinking
    #[serde(default = "default_shrink_interval")]
    pub shrink_interval: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            max_pool_size: default_max_pool_size(),
            min_pool_size: default_min_pool_size(),
            shrink_interval: default_shrink_interval(),
        }
    }
}

impl PoolConfig {
    /// Create a configuration with the given bounds and shrink interval
    pub fn new(min_pool_size: usize, max_pool_size: usize, shrink_interval: u64) -> Self {
        PoolConfig {
            max_pool_size,
            min_pool_size,
            shrink_interval,
        }
    }

    /// Shrink interval as a duration, `None` when shrinking is disabled
    pub fn shrink_interval(&self) -> Option<Duration> {
        match self.shrink_interval {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Validate the pool configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_pool_size == 0 {
            return Err("max_pool_size must be greater than 0".to_string());
        }
        if self.min_pool_size > self.max_pool_size {
            return Err("min_pool_size cannot be greater than max_pool_size".to_string());
        }
        Ok(())
    }
}
