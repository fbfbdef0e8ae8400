//! Readiness registry
//!
//! Associates live connections with the pool that owns them so inbound data
//! events can be routed back without the pool polling.

use super::{ConnId, PoolId};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Mutex, PoisonError};

/// Registry of live connections and their owning pools
///
/// Implementations are shared between pools and threads and must synchronize
/// internally.
pub trait ReadinessRegistry: Debug + Send + Sync {
    /// Associate a freshly created connection with its pool
    fn register(&self, conn: ConnId, pool: PoolId);

    /// Forget a connection that is about to be destroyed
    fn unregister(&self, conn: ConnId);
}

/// Registry that routes nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRegistry;

impl ReadinessRegistry for NoopRegistry {
    fn register(&self, _conn: ConnId, _pool: PoolId) {}

    fn unregister(&self, _conn: ConnId) {}
}

/// In-memory registry backed by a map
#[derive(Debug, Default)]
pub struct ReadinessTable {
    owners: Mutex<HashMap<ConnId, PoolId>>,
}

impl ReadinessTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Pool that owns `conn`, if it is registered
    pub fn pool_for(&self, conn: ConnId) -> Option<PoolId> {
        self.owners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&conn)
            .copied()
    }

    /// Number of registered connections
    pub fn len(&self) -> usize {
        self.owners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no connection is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReadinessRegistry for ReadinessTable {
    fn register(&self, conn: ConnId, pool: PoolId) {
        self.owners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(conn, pool);
    }

    fn unregister(&self, conn: ConnId) {
        self.owners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&conn);
    }
}
