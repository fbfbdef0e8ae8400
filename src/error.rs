//! Error types for Sockpool
//!
//! This module defines all custom error types used throughout the crate.

use thiserror::Error;

/// Main error type for Sockpool operations
#[derive(Error, Debug)]
pub enum SockpoolError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pool error
    #[error("Pool error: {0}")]
    Pool(#[from] PoolError),
}

/// Errors returned at the `acquire` boundary of a connection pool
#[derive(Error, Debug)]
pub enum PoolError {
    /// The connection factory could not establish a new connection
    #[error("failed to create connection to {endpoint}: {source:#}")]
    CreationFailed {
        /// Endpoint the pool connects to
        endpoint: String,
        /// Underlying factory failure
        #[source]
        source: anyhow::Error,
    },

    /// Every connection is in use and the pool is at capacity
    #[error("connection pool for {endpoint} exhausted ({max} connections in use)")]
    PoolExhausted {
        /// Endpoint the pool connects to
        endpoint: String,
        /// Configured maximum pool size
        max: usize,
    },
}

impl PoolError {
    /// Whether this error means "no connection available"
    ///
    /// Creation failures and exhaustion are distinct variants, but callers that
    /// only care whether they got a connection can treat both the same way.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            PoolError::CreationFailed { .. } | PoolError::PoolExhausted { .. }
        )
    }

    /// Whether the pool was saturated
    pub fn is_exhausted(&self) -> bool {
        matches!(self, PoolError::PoolExhausted { .. })
    }
}
