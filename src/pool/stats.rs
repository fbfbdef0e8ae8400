//! Pool statistics
//!
//! Counters for observing pool behaviour over time.

use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Statistics for the connection pool
#[derive(Debug, Default)]
pub struct PoolStats {
    /// Total connections created
    pub total_created: AtomicUsize,
    /// Total acquisitions served from the free list
    pub total_reused: AtomicUsize,
    /// Total connections returned
    pub total_released: AtomicUsize,
    /// Total connections destroyed (closed, shrunk or drained)
    pub total_destroyed: AtomicUsize,
    /// Total connections reclaimed by shrink passes
    pub total_shrunk: AtomicUsize,
    /// Total factory failures
    pub creation_failures: AtomicUsize,
    /// Total acquisitions refused because the pool was full
    pub exhausted: AtomicUsize,
}

impl PoolStats {
    /// Create new pool stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a connection creation
    pub fn record_created(&self) {
        self.total_created.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an acquisition served from the free list
    pub fn record_reused(&self) {
        self.total_reused.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a connection return
    pub fn record_released(&self) {
        self.total_released.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a connection destruction
    pub fn record_destroyed(&self) {
        self.total_destroyed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record connections reclaimed by a shrink pass
    pub fn record_shrunk(&self, count: usize) {
        self.total_shrunk.fetch_add(count, Ordering::Relaxed);
        self.total_destroyed.fetch_add(count, Ordering::Relaxed);
    }

    /// Record a factory failure
    pub fn record_creation_failure(&self) {
        self.creation_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an exhausted acquisition
    pub fn record_exhausted(&self) {
        self.exhausted.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current stats snapshot
    pub fn snapshot(&self) -> PoolStatsSnapshot {
        PoolStatsSnapshot {
            total_created: self.total_created.load(Ordering::Relaxed),
            total_reused: self.total_reused.load(Ordering::Relaxed),
            total_released: self.total_released.load(Ordering::Relaxed),
            total_destroyed: self.total_destroyed.load(Ordering::Relaxed),
            total_shrunk: self.total_shrunk.load(Ordering::Relaxed),
            creation_failures: self.creation_failures.load(Ordering::Relaxed),
            exhausted: self.exhausted.load(Ordering::Relaxed),
        }
    }

    /// Log pool health status
    pub fn log_health(&self, live: usize, idle: usize) {
        let stats = self.snapshot();
        debug!(
            "Pool health: live={}, idle={}, created={}, reused={}, released={}, destroyed={}, shrunk={}, failures={}, exhausted={}",
            live,
            idle,
            stats.total_created,
            stats.total_reused,
            stats.total_released,
            stats.total_destroyed,
            stats.total_shrunk,
            stats.creation_failures,
            stats.exhausted
        );
    }
}

/// Snapshot of pool statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStatsSnapshot {
    /// Total connections created
    pub total_created: usize,
    /// Total acquisitions served from the free list
    pub total_reused: usize,
    /// Total connections returned
    pub total_released: usize,
    /// Total connections destroyed
    pub total_destroyed: usize,
    /// Total connections reclaimed by shrink passes
    pub total_shrunk: usize,
    /// Total factory failures
    pub creation_failures: usize,
    /// Total acquisitions refused because the pool was full
    pub exhausted: usize,
}
