//! Connection pool module for Sockpool
//!
//! This module provides the bounded connection pool, the handles it deals
//! in, and the readiness registry it reports connection lifetimes to.

mod connection_pool;
mod guard;
mod handle;
mod registry;
mod stats;

pub use connection_pool::ConnectionPool;
pub use guard::PooledConnection;
pub use handle::{ConnId, PoolId};
pub use registry::{NoopRegistry, ReadinessRegistry, ReadinessTable};
pub use stats::{PoolStats, PoolStatsSnapshot};

use crate::config::Config;
use crate::error::SockpoolError;
use crate::transport::TcpConnector;
use std::sync::Arc;

/// Create a TCP connection pool from a loaded configuration
pub fn create_tcp_pool(
    config: &Config,
    registry: Arc<dyn ReadinessRegistry>,
) -> Result<ConnectionPool<TcpConnector>, SockpoolError> {
    config.validate()?;
    ConnectionPool::new(
        config.endpoint.to_endpoint(),
        config.pool.clone(),
        Arc::new(TcpConnector::new(&config.tcp)),
        registry,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    #[test]
    fn test_create_tcp_pool_from_config() {
        let config = parse_config(
            r#"
[endpoint]
host = "127.0.0.1"
port = 6553

[pool]
max_pool_size = 3
min_pool_size = 1
"#,
        )
        .unwrap();

        let pool = create_tcp_pool(&config, Arc::new(NoopRegistry)).unwrap();
        assert_eq!(pool.endpoint().to_string(), "127.0.0.1:6553");
        assert_eq!(pool.config().max_pool_size, 3);
        assert_eq!(pool.live_count(), 0);
    }
}
