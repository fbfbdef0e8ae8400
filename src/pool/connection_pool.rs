//! Connection pool implementation
//!
//! Manages a bounded set of reusable connections to a single endpoint. Idle
//! connections are reused most-recently-released first and reclaimed
//! least-recently-released first by a lazy, time-gated shrink pass that runs
//! on release.

use super::guard::PooledConnection;
use super::registry::ReadinessRegistry;
use super::stats::PoolStats;
use super::{ConnId, PoolId};
use crate::config::PoolConfig;
use crate::error::{PoolError, SockpoolError};
use crate::transport::{ConnectionFactory, Endpoint};
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Mutable pool bookkeeping, guarded by the pool mutex
#[derive(Debug)]
struct PoolState {
    /// Idle connections, oldest release at the front
    free: VecDeque<ConnId>,
    /// Every connection currently open, idle or in use
    live: HashSet<ConnId>,
    /// Checked-out connections dropped from the live set by `close_all`
    forgotten: HashSet<ConnId>,
    /// Smallest idle count seen since the last shrink evaluation
    low_water_mark: usize,
    /// When the last shrink evaluation ran
    last_shrink_check: Instant,
}

impl PoolState {
    fn check_invariants(&self, max_pool_size: usize) {
        debug_assert!(self.live.len() <= max_pool_size, "live count above max");
        debug_assert!(self.free.len() <= self.live.len(), "more idle than live");
        debug_assert!(self.low_water_mark <= self.free.len(), "low-water mark above idle count");
    }
}

/// Bounded pool of connections to one endpoint
///
/// All bookkeeping happens under a single mutex. Connection establishment runs
/// while that mutex is held, so connects to the endpoint are serialized. An
/// exhausted pool fails immediately instead of queueing.
#[derive(Debug)]
pub struct ConnectionPool<F: ConnectionFactory> {
    /// Identity used for registry routing
    id: PoolId,
    /// Remote endpoint
    endpoint: Endpoint,
    /// Pool configuration
    config: PoolConfig,
    /// Factory that opens and closes connections
    factory: Arc<F>,
    /// Registry notified of connection creation and destruction
    registry: Arc<dyn ReadinessRegistry>,
    /// Bookkeeping
    state: Mutex<PoolState>,
    /// Statistics
    stats: PoolStats,
}

impl<F: ConnectionFactory> ConnectionPool<F> {
    /// Create a new pool
    ///
    /// No connection is opened until the first [`acquire`](Self::acquire).
    pub fn new(
        endpoint: Endpoint,
        config: PoolConfig,
        factory: Arc<F>,
        registry: Arc<dyn ReadinessRegistry>,
    ) -> Result<Self, SockpoolError> {
        config.validate().map_err(SockpoolError::Config)?;

        let id = PoolId::next();
        info!(
            "Created {} for {} (max={}, min={}, shrink_interval={}s)",
            id, endpoint, config.max_pool_size, config.min_pool_size, config.shrink_interval
        );

        Ok(ConnectionPool {
            id,
            endpoint,
            state: Mutex::new(PoolState {
                free: VecDeque::with_capacity(config.max_pool_size),
                live: HashSet::with_capacity(config.max_pool_size),
                forgotten: HashSet::new(),
                low_water_mark: 0,
                last_shrink_check: Instant::now(),
            }),
            config,
            factory,
            registry,
            stats: PoolStats::new(),
        })
    }

    /// Acquire a connection
    ///
    /// Reuses the most recently released idle connection, otherwise opens a
    /// new one if the pool is below `max_pool_size`. The handle must be given
    /// back with [`release`](Self::release) or
    /// [`close_connection`](Self::close_connection).
    pub fn acquire(&self) -> Result<ConnId, PoolError> {
        let mut state = self.lock_state();

        let result = if let Some(conn) = state.free.pop_back() {
            self.stats.record_reused();
            debug!("Reusing connection {} from {}", conn, self.id);
            Ok(conn)
        } else if state.live.len() < self.config.max_pool_size {
            self.create_locked(&mut state)
        } else {
            self.stats.record_exhausted();
            warn!(
                "Connection pool for {} exhausted: {} connections in use",
                self.endpoint,
                state.live.len()
            );
            Err(PoolError::PoolExhausted {
                endpoint: self.endpoint.to_string(),
                max: self.config.max_pool_size,
            })
        };

        state.low_water_mark = state.low_water_mark.min(state.free.len());
        state.check_invariants(self.config.max_pool_size);

        result
    }

    /// Acquire a connection wrapped in a guard that releases it on drop
    pub fn get(&self) -> Result<PooledConnection<'_, F>, PoolError> {
        self.acquire().map(|conn| PooledConnection::new(self, conn))
    }

    /// Return a connection for reuse
    ///
    /// The connection stays open. Invalid handles and handles this pool never
    /// handed out are ignored. May run a shrink pass if the shrink interval
    /// has elapsed.
    pub fn release(&self, conn: ConnId) {
        self.release_at(conn, Instant::now());
    }

    fn release_at(&self, conn: ConnId, now: Instant) {
        if !conn.is_valid() {
            return;
        }

        let mut state = self.lock_state();

        if !state.live.contains(&conn) {
            if state.forgotten.remove(&conn) {
                drop(state);
                debug!("Connection {} outlived close_all of {}, closing it", conn, self.id);
                self.registry.unregister(conn);
                self.factory.destroy(conn);
            } else {
                warn!("Ignoring release of connection {} not owned by {}", conn, self.id);
            }
            return;
        }

        if state.free.contains(&conn) {
            warn!("Connection {} released twice to {}", conn, self.id);
            return;
        }

        state.free.push_back(conn);
        self.stats.record_released();
        debug!("Connection {} returned to {}, idle: {}", conn, self.id, state.free.len());

        if self.shrink_due(&state, now) {
            self.shrink_locked(&mut state, now);
        }

        state.check_invariants(self.config.max_pool_size);
    }

    /// Close a connection the caller found to be broken
    ///
    /// Works for idle and checked-out connections alike. Closing the same
    /// handle twice only counts it once. Invalid handles and handles this pool
    /// never handed out are ignored.
    pub fn close_connection(&self, conn: ConnId) {
        if !conn.is_valid() {
            return;
        }

        let (was_live, was_forgotten) = {
            let mut state = self.lock_state();
            if let Some(pos) = state.free.iter().position(|idle| *idle == conn) {
                state.free.remove(pos);
            }
            let was_live = state.live.remove(&conn);
            let was_forgotten = state.forgotten.remove(&conn);
            state.low_water_mark = state.low_water_mark.min(state.free.len());
            state.check_invariants(self.config.max_pool_size);
            (was_live, was_forgotten)
        };

        if was_live {
            self.stats.record_destroyed();
            debug!("Closing connection {} of {}", conn, self.id);
        } else if was_forgotten {
            debug!("Closing connection {} that outlived close_all of {}", conn, self.id);
        } else {
            debug!("Connection {} already closed or not owned by {}", conn, self.id);
            return;
        }

        self.registry.unregister(conn);
        self.factory.destroy(conn);
    }

    /// Close every idle connection and reset the live count
    ///
    /// Connections that are checked out are not closed; the pool forgets
    /// them, and releasing or closing one later destroys it instead of
    /// reusing it.
    pub fn close_all(&self) {
        let mut state = self.lock_state();

        let mut closed = 0;
        while let Some(conn) = state.free.pop_back() {
            state.live.remove(&conn);
            self.registry.unregister(conn);
            self.factory.destroy(conn);
            self.stats.record_destroyed();
            closed += 1;
        }

        if !state.live.is_empty() {
            warn!(
                "{} connections to {} still checked out while closing {}",
                state.live.len(),
                self.endpoint,
                self.id
            );
        }
        let outstanding = std::mem::take(&mut state.live);
        state.forgotten.extend(outstanding);
        state.low_water_mark = 0;

        info!("Closed {} idle connections to {}", closed, self.endpoint);
    }

    /// Open a connection while the pool lock is held
    ///
    /// The only place the factory's `create` is called. Splitting slot
    /// reservation from the connect would happen here.
    fn create_locked(&self, state: &mut PoolState) -> Result<ConnId, PoolError> {
        let conn = match self.factory.create(&self.endpoint, self.id, &self.config) {
            Ok(conn) if conn.is_valid() => conn,
            Ok(conn) => {
                self.stats.record_creation_failure();
                warn!("Factory returned invalid handle {} for {}", conn, self.endpoint);
                return Err(PoolError::CreationFailed {
                    endpoint: self.endpoint.to_string(),
                    source: anyhow::anyhow!("invalid connection handle {}", conn),
                });
            }
            Err(e) => {
                self.stats.record_creation_failure();
                warn!("Failed to create connection to {}: {:#}", self.endpoint, e);
                return Err(PoolError::CreationFailed {
                    endpoint: self.endpoint.to_string(),
                    source: e,
                });
            }
        };

        let inserted = state.live.insert(conn);
        debug_assert!(inserted, "factory reissued live handle {}", conn);

        self.registry.register(conn, self.id);
        self.stats.record_created();
        debug!(
            "Created connection {} to {}, live: {}",
            conn,
            self.endpoint,
            state.live.len()
        );

        Ok(conn)
    }

    fn shrink_due(&self, state: &PoolState, now: Instant) -> bool {
        self.config
            .shrink_interval()
            .is_some_and(|interval| now.saturating_duration_since(state.last_shrink_check) > interval)
    }

    /// Reclaim idle connections that stayed unused for the whole interval
    fn shrink_locked(&self, state: &mut PoolState, now: Instant) {
        state.last_shrink_check = now;

        let budget = state.low_water_mark;
        let mut reclaimed = 0;
        while reclaimed < budget && state.live.len() > self.config.min_pool_size {
            let Some(conn) = state.free.pop_front() else {
                break;
            };
            state.live.remove(&conn);
            self.registry.unregister(conn);
            self.factory.destroy(conn);
            reclaimed += 1;
        }

        // Next interval's budget starts from what is idle now
        state.low_water_mark = state.free.len();

        if reclaimed > 0 {
            self.stats.record_shrunk(reclaimed);
            info!(
                "Shrunk {} by {} connections, live: {}, idle: {}",
                self.id,
                reclaimed,
                state.live.len(),
                state.free.len()
            );
        } else {
            debug!("Shrink check for {} reclaimed nothing", self.id);
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pool identity
    pub fn id(&self) -> PoolId {
        self.id
    }

    /// Remote endpoint
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Pool configuration
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Connection factory
    pub fn factory(&self) -> &Arc<F> {
        &self.factory
    }

    /// Connections currently open, idle or in use
    pub fn live_count(&self) -> usize {
        self.lock_state().live.len()
    }

    /// Connections currently idle
    pub fn idle_count(&self) -> usize {
        self.lock_state().free.len()
    }

    /// Idle trough tracked for the next shrink pass
    pub fn low_water_mark(&self) -> usize {
        self.lock_state().low_water_mark
    }

    /// Get pool statistics
    pub fn stats(&self) -> &PoolStats {
        &self.stats
    }

    /// Log pool health status
    pub fn log_health(&self) {
        let (live, idle) = {
            let state = self.lock_state();
            (state.live.len(), state.free.len())
        };
        self.stats.log_health(live, idle);
    }
}

impl<F: ConnectionFactory> Drop for ConnectionPool<F> {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if state.live.is_empty() {
            return;
        }
        self.close_all();
    }
}
