//! Connection and pool identifiers

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque handle to one live connection
///
/// Handles are issued by a [`ConnectionFactory`](crate::transport::ConnectionFactory).
/// Zero is never issued and marks an invalid handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnId(u64);

impl ConnId {
    /// Wrap a raw handle value
    pub const fn new(raw: u64) -> Self {
        ConnId(raw)
    }

    /// Raw handle value
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Whether this handle can refer to a connection
    pub const fn is_valid(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one pool instance, used to route events back to it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolId(u64);

impl PoolId {
    /// Allocate a process-unique pool id
    pub fn next() -> Self {
        PoolId(NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id value
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool-{}", self.0)
    }
}
