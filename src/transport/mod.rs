//! Transport module for Sockpool
//!
//! This module provides the connection factory abstraction consumed by the
//! pool and a plain TCP implementation of it.

mod addr;
mod tcp;

pub use addr::Endpoint;
pub use tcp::TcpConnector;

use crate::config::{PoolConfig, TcpConfig};
use crate::pool::{ConnId, PoolId};
use anyhow::Result;
use std::fmt::Debug;
use std::net::TcpStream;
use std::time::Duration;

/// Socket options for configuring connections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketOpts {
    /// Enable TCP_NODELAY
    pub nodelay: bool,
    /// TCP keepalive timeout
    pub keepalive_secs: Option<u64>,
    /// TCP keepalive interval
    pub keepalive_interval: Option<u64>,
    /// Read timeout applied to the stream
    pub read_timeout: Option<Duration>,
    /// Write timeout applied to the stream
    pub write_timeout: Option<Duration>,
}

impl Default for SocketOpts {
    fn default() -> Self {
        SocketOpts {
            nodelay: true,
            keepalive_secs: Some(20),
            keepalive_interval: Some(8),
            read_timeout: None,
            write_timeout: None,
        }
    }
}

impl SocketOpts {
    /// Create socket options from TCP config
    pub fn from_tcp_config(config: &TcpConfig) -> Self {
        SocketOpts {
            nodelay: config.nodelay,
            keepalive_secs: Some(config.keepalive_secs),
            keepalive_interval: Some(config.keepalive_interval),
            read_timeout: config.read_timeout.map(Duration::from_secs),
            write_timeout: config.write_timeout.map(Duration::from_secs),
        }
    }

    /// Apply socket options to a TCP stream
    pub fn apply(&self, stream: &TcpStream) -> std::io::Result<()> {
        stream.set_nodelay(self.nodelay)?;
        stream.set_read_timeout(self.read_timeout)?;
        stream.set_write_timeout(self.write_timeout)?;

        if let (Some(timeout), Some(interval)) = (self.keepalive_secs, self.keepalive_interval) {
            let socket = socket2::SockRef::from(stream);
            let keepalive = socket2::TcpKeepalive::new()
                .with_time(Duration::from_secs(timeout))
                .with_interval(Duration::from_secs(interval));
            socket.set_tcp_keepalive(&keepalive)?;
        }

        Ok(())
    }
}

/// Factory for the low-level connections a pool hands out
///
/// The factory owns the actual sockets; the pool only ever sees the
/// [`ConnId`] handles it returns. Implementations must be usable from many
/// threads at once.
pub trait ConnectionFactory: Debug + Send + Sync + 'static {
    /// Open a new connection to `endpoint` on behalf of pool `pool`
    ///
    /// May block. A failed attempt must not leak resources, and the returned
    /// handle must be valid (non-zero).
    fn create(&self, endpoint: &Endpoint, pool: PoolId, config: &PoolConfig) -> Result<ConnId>;

    /// Close a connection
    ///
    /// Best effort and idempotent: destroying an unknown or already destroyed
    /// handle does nothing.
    fn destroy(&self, conn: ConnId);
}
