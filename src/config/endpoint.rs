//! Root configuration types
//!
//! Defines the top-level configuration and the remote endpoint section.

use super::{PoolConfig, TcpConfig};
use crate::error::SockpoolError;
use crate::transport::Endpoint;
use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Remote endpoint the pool connects to
    pub endpoint: EndpointConfig,

    /// Connection pool configuration
    #[serde(default)]
    pub pool: PoolConfig,

    /// TCP socket configuration
    #[serde(default)]
    pub tcp: TcpConfig,
}

impl Config {
    /// Validate every section
    pub fn validate(&self) -> Result<(), SockpoolError> {
        self.endpoint.validate().map_err(SockpoolError::Config)?;
        self.pool.validate().map_err(SockpoolError::Config)?;
        self.tcp.validate().map_err(SockpoolError::Config)?;
        Ok(())
    }
}

/// Remote endpoint configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    /// Host name or IP address
    pub host: String,

    /// TCP port
    pub port: u16,
}

impl EndpointConfig {
    /// Build the endpoint identity used by the pool
    pub fn to_endpoint(&self) -> Endpoint {
        Endpoint::new(&self.host, self.port)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("endpoint host cannot be empty".to_string());
        }
        if self.port == 0 {
            return Err("endpoint port must be greater than 0".to_string());
        }
        Ok(())
    }
}
