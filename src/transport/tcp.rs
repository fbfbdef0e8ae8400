//! TCP connection factory
//!
//! Opens plain TCP connections and keeps the sockets in a table keyed by the
//! handle given to the pool.

use super::{ConnectionFactory, Endpoint, SocketOpts};
use crate::config::{PoolConfig, TcpConfig};
use crate::pool::{ConnId, PoolId};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;

/// Default connection timeout in seconds
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// TCP factory for plain connections
#[derive(Debug)]
pub struct TcpConnector {
    /// Socket options to apply to connections
    socket_opts: SocketOpts,
    /// Connection timeout
    connect_timeout: Duration,
    /// Next handle to hand out, starts at 1
    next_id: AtomicU64,
    /// Open sockets
    streams: Mutex<HashMap<ConnId, Arc<TcpStream>>>,
}

impl TcpConnector {
    /// Create a new TCP connector from configuration
    pub fn new(config: &TcpConfig) -> Self {
        TcpConnector::with_defaults()
            .with_socket_opts(SocketOpts::from_tcp_config(config))
            .with_connect_timeout(config.connect_timeout())
    }

    /// Create a new TCP connector with default options
    pub fn with_defaults() -> Self {
        TcpConnector {
            socket_opts: SocketOpts::default(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            next_id: AtomicU64::new(1),
            streams: Mutex::new(HashMap::new()),
        }
    }

    /// Set socket options
    pub fn with_socket_opts(mut self, opts: SocketOpts) -> Self {
        self.socket_opts = opts;
        self
    }

    /// Set connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Get the socket behind a handle
    ///
    /// `&TcpStream` implements `Read` and `Write`, so callers can do I/O on the
    /// returned stream without holding the table lock.
    pub fn stream(&self, conn: ConnId) -> Option<Arc<TcpStream>> {
        self.streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&conn)
            .cloned()
    }

    /// Number of sockets currently open
    pub fn stream_count(&self) -> usize {
        self.streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn connect(&self, endpoint: &Endpoint) -> Result<TcpStream> {
        let resolved = endpoint.resolve()?;

        let stream = TcpStream::connect_timeout(&resolved, self.connect_timeout)
            .inspect_err(|_| endpoint.clear_cache())
            .with_context(|| format!("Failed to connect to {}", endpoint))?;

        self.socket_opts
            .apply(&stream)
            .with_context(|| format!("Failed to apply socket options for {}", endpoint))?;

        Ok(stream)
    }
}

impl ConnectionFactory for TcpConnector {
    fn create(&self, endpoint: &Endpoint, pool: PoolId, _config: &PoolConfig) -> Result<ConnId> {
        let stream = self.connect(endpoint)?;
        let conn = ConnId::new(self.next_id.fetch_add(1, Ordering::Relaxed));

        self.streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(conn, Arc::new(stream));

        debug!("TCP connection {} established to {} for {}", conn, endpoint, pool);
        Ok(conn)
    }

    fn destroy(&self, conn: ConnId) {
        let stream = self
            .streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&conn);

        if let Some(stream) = stream {
            if let Err(e) = stream.shutdown(Shutdown::Both) {
                // The peer may already be gone
                debug!("Shutdown of connection {} failed: {}", conn, e);
            }
            debug!("TCP connection {} closed", conn);
        } else {
            debug!("Connection {} already closed", conn);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    fn listener() -> (TcpListener, Endpoint) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = Endpoint::from_socket_addr(listener.local_addr().unwrap());
        (listener, endpoint)
    }

    #[test]
    fn test_tcp_connector_builder() {
        let connector = TcpConnector::with_defaults()
            .with_connect_timeout(Duration::from_secs(3))
            .with_socket_opts(SocketOpts {
                nodelay: false,
                ..Default::default()
            });

        assert_eq!(connector.connect_timeout, Duration::from_secs(3));
        assert!(!connector.socket_opts.nodelay);
        assert_eq!(connector.stream_count(), 0);
    }

    #[test]
    fn test_tcp_connector_from_config() {
        let config = TcpConfig {
            connect_timeout: 2,
            ..Default::default()
        };
        let connector = TcpConnector::new(&config);
        assert_eq!(connector.connect_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_create_and_destroy() {
        let (listener, endpoint) = listener();
        let connector = TcpConnector::with_defaults();
        let pool = PoolId::next();

        let first = connector
            .create(&endpoint, pool, &PoolConfig::default())
            .unwrap();
        let second = connector
            .create(&endpoint, pool, &PoolConfig::default())
            .unwrap();

        assert!(first.is_valid());
        assert_ne!(first, second);
        assert_eq!(connector.stream_count(), 2);

        connector.destroy(first);
        assert_eq!(connector.stream_count(), 1);
        assert!(connector.stream(first).is_none());

        // Idempotent
        connector.destroy(first);
        assert_eq!(connector.stream_count(), 1);

        drop(listener);
    }

    #[test]
    fn test_stream_io() {
        let (listener, endpoint) = listener();
        let connector = TcpConnector::with_defaults();
        let conn = connector
            .create(&endpoint, PoolId::next(), &PoolConfig::default())
            .unwrap();

        let (mut server, _) = listener.accept().unwrap();
        let stream = connector.stream(conn).unwrap();
        (&*stream).write_all(b"ping").unwrap();

        let mut buf = [0u8; 4];
        server.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"ping");
    }

    #[test]
    fn test_create_refused() {
        let (listener, endpoint) = listener();
        drop(listener);

        let connector = TcpConnector::with_defaults().with_connect_timeout(Duration::from_secs(1));
        let result = connector.create(&endpoint, PoolId::next(), &PoolConfig::default());

        assert!(result.is_err());
        assert_eq!(connector.stream_count(), 0);
    }
}
