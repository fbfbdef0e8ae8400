//! Test utilities and fakes for Sockpool
//!
//! This module provides common test utilities used across integration tests.

#![allow(dead_code)]

use sockpool::config::PoolConfig;
use sockpool::pool::{ConnId, ConnectionPool, PoolId, ReadinessTable};
use sockpool::transport::{ConnectionFactory, Endpoint, TcpConnector};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Create a test TCP listener on an available port
pub fn create_test_listener() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// Accept connections in the background and keep them open
///
/// The returned handle yields the accepted streams once `count` connections
/// have arrived.
pub fn spawn_acceptor(listener: TcpListener, count: usize) -> JoinHandle<Vec<TcpStream>> {
    thread::spawn(move || {
        let mut accepted = Vec::with_capacity(count);
        for _ in 0..count {
            match listener.accept() {
                Ok((stream, _)) => accepted.push(stream),
                Err(_) => break,
            }
        }
        accepted
    })
}

/// Build a TCP pool pointing at `addr`
pub fn tcp_pool(
    addr: SocketAddr,
    config: PoolConfig,
) -> (ConnectionPool<TcpConnector>, Arc<ReadinessTable>) {
    let registry = Arc::new(ReadinessTable::new());
    let connector = TcpConnector::with_defaults().with_connect_timeout(Duration::from_secs(2));
    let pool = ConnectionPool::new(
        Endpoint::from_socket_addr(addr),
        config,
        Arc::new(connector),
        registry.clone(),
    )
    .unwrap();
    (pool, registry)
}

/// Factory that hands out sequential handles and records destruction
#[derive(Debug, Default)]
pub struct FakeFactory {
    next: AtomicU64,
    fail: AtomicBool,
    connect_delay_ms: AtomicU64,
    destroyed: Mutex<Vec<ConnId>>,
}

impl FakeFactory {
    /// Create a new fake factory
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent creations fail
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Make each creation block for `delay`
    pub fn set_connect_delay(&self, delay: Duration) {
        self.connect_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Number of connections created so far
    pub fn created(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }

    /// Handles destroyed so far, in order
    pub fn destroyed(&self) -> Vec<ConnId> {
        self.destroyed.lock().unwrap().clone()
    }
}

impl ConnectionFactory for FakeFactory {
    fn create(&self, _: &Endpoint, _: PoolId, _: &PoolConfig) -> anyhow::Result<ConnId> {
        let delay = self.connect_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            thread::sleep(Duration::from_millis(delay));
        }
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("network unreachable");
        }
        Ok(ConnId::new(self.next.fetch_add(1, Ordering::SeqCst) + 1))
    }

    fn destroy(&self, conn: ConnId) {
        self.destroyed.lock().unwrap().push(conn);
    }
}

/// Build a pool over a [`FakeFactory`]
pub fn fake_pool(
    config: PoolConfig,
) -> (
    ConnectionPool<FakeFactory>,
    Arc<FakeFactory>,
    Arc<ReadinessTable>,
) {
    let factory = Arc::new(FakeFactory::new());
    let registry = Arc::new(ReadinessTable::new());
    let pool = ConnectionPool::new(
        Endpoint::new("fake.internal", 4000),
        config,
        factory.clone(),
        registry.clone(),
    )
    .unwrap();
    (pool, factory, registry)
}
