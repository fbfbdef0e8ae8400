//! RAII guard for pooled connections
//!
//! Provides automatic return of connections to the pool when dropped.

use super::{ConnId, ConnectionPool};
use crate::transport::ConnectionFactory;
use std::fmt;

/// RAII guard that releases the connection to its pool on drop
///
/// Call [`discard`](Self::discard) instead of dropping when the connection
/// turned out to be broken.
pub struct PooledConnection<'a, F: ConnectionFactory> {
    /// Owning pool
    pool: &'a ConnectionPool<F>,
    /// The handle (Option to allow taking)
    conn: Option<ConnId>,
}

impl<'a, F: ConnectionFactory> PooledConnection<'a, F> {
    pub(crate) fn new(pool: &'a ConnectionPool<F>, conn: ConnId) -> Self {
        PooledConnection {
            pool,
            conn: Some(conn),
        }
    }

    /// Handle of the guarded connection
    pub fn id(&self) -> ConnId {
        self.conn.unwrap_or(ConnId::new(0))
    }

    /// Pool the connection belongs to
    pub fn pool(&self) -> &'a ConnectionPool<F> {
        self.pool
    }

    /// Close the connection instead of returning it
    pub fn discard(mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.close_connection(conn);
        }
    }

    /// Detach the handle from the guard
    ///
    /// The caller becomes responsible for releasing or closing it.
    pub fn take(mut self) -> ConnId {
        self.conn.take().unwrap_or(ConnId::new(0))
    }
}

impl<F: ConnectionFactory> fmt::Debug for PooledConnection<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledConnection")
            .field("pool", &self.pool.id())
            .field("conn", &self.conn)
            .finish()
    }
}

impl<F: ConnectionFactory> Drop for PooledConnection<'_, F> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.release(conn);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolConfig;
    use crate::pool::{NoopRegistry, PoolId};
    use crate::transport::Endpoint;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Default)]
    struct CountingFactory {
        next: AtomicU64,
        destroyed: AtomicU64,
    }

    impl ConnectionFactory for CountingFactory {
        fn create(&self, _: &Endpoint, _: PoolId, _: &PoolConfig) -> anyhow::Result<ConnId> {
            Ok(ConnId::new(self.next.fetch_add(1, Ordering::SeqCst) + 1))
        }

        fn destroy(&self, _: ConnId) {
            self.destroyed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn pool() -> ConnectionPool<CountingFactory> {
        ConnectionPool::new(
            Endpoint::new("localhost", 7000),
            PoolConfig::new(0, 2, 0),
            Arc::new(CountingFactory::default()),
            Arc::new(NoopRegistry),
        )
        .unwrap()
    }

    #[test]
    fn test_guard_drop_returns_to_pool() {
        let pool = pool();
        let id = {
            let guard = pool.get().unwrap();
            assert_eq!(pool.idle_count(), 0);
            guard.id()
        };

        assert_eq!(pool.idle_count(), 1);
        assert_eq!(pool.get().unwrap().id(), id);
    }

    #[test]
    fn test_guard_discard_closes() {
        let pool = pool();
        let guard = pool.get().unwrap();
        guard.discard();

        assert_eq!(pool.live_count(), 0);
        assert_eq!(pool.idle_count(), 0);
        assert_eq!(pool.factory().destroyed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_guard_take() {
        let pool = pool();
        let conn = pool.get().unwrap().take();

        // Not returned since we took the handle
        assert_eq!(pool.idle_count(), 0);
        assert_eq!(pool.live_count(), 1);

        pool.release(conn);
        assert_eq!(pool.idle_count(), 1);
    }

    #[test]
    fn test_guard_debug() {
        let pool = pool();
        let guard = pool.get().unwrap();
        assert!(format!("{:?}", guard).contains("PooledConnection"));
        assert_eq!(guard.pool().id(), pool.id());
    }
}
