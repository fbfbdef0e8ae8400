//! # Sockpool - Bounded Connection Pool
//!
//! Sockpool keeps a bounded set of reusable connections to a single remote
//! endpoint. Callers borrow a connection, use it, and return it; the pool
//! opens connections lazily and reclaims idle ones over time.
//!
//! ## Features
//!
//! - **Bounded**: never more than `max_pool_size` connections open at once
//! - **MRU Reuse**: the most recently returned connection is handed out first
//! - **Lazy Shrink**: idle connections are reclaimed oldest first on release,
//!   never below `min_pool_size`
//! - **Fail Fast**: an exhausted pool returns an error instead of blocking
//! - **Pluggable**: connection creation and readiness routing are traits
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sockpool::config::load_config;
//! use sockpool::pool::{create_tcp_pool, ReadinessTable};
//! use std::sync::Arc;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = load_config("sockpool.toml")?;
//!     let pool = create_tcp_pool(&config, Arc::new(ReadinessTable::new()))?;
//!
//!     let conn = pool.get()?;
//!     if let Some(stream) = pool.factory().stream(conn.id()) {
//!         // talk to the endpoint over `&*stream`
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! caller -> ConnectionPool -> ConnectionFactory (opens/closes sockets)
//!                          -> ReadinessRegistry (routes socket events)
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod pool;
pub mod transport;

// Re-export commonly used items
pub use config::{load_config, Config, PoolConfig};
pub use error::{PoolError, SockpoolError};
pub use pool::{ConnId, ConnectionPool, PoolId, PooledConnection, ReadinessRegistry};
pub use transport::{ConnectionFactory, Endpoint, TcpConnector};

/// Version of the Sockpool library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the application
pub const NAME: &str = env!("CARGO_PKG_NAME");
