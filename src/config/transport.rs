//! Transport configuration types
//!
//! Defines socket-level options for connections created by the TCP factory.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default keepalive seconds
fn default_keepalive_secs() -> u64 {
    20
}

/// Default keepalive interval
fn default_keepalive_interval() -> u64 {
    8
}

/// Default connect timeout in seconds
fn default_connect_timeout() -> u64 {
    10
}

/// Default TCP_NODELAY setting
fn default_nodelay() -> bool {
    true
}

/// TCP transport configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TcpConfig {
    /// Enable TCP_NODELAY
    #[serde(default = "default_nodelay")]
    pub nodelay: bool,

    /// TCP keepalive timeout in seconds
    #[serde(default = "default_keepalive_secs")]
    pub keepalive_secs: u64,

    /// TCP keepalive interval in seconds
    #[serde(default = "default_keepalive_interval")]
    pub keepalive_interval: u64,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// Optional read timeout in seconds
    #[serde(default)]
    pub read_timeout: Option<u64>,

    /// Optional write timeout in seconds
    #[serde(default)]
    pub write_timeout: Option<u64>,
}

impl Default for TcpConfig {
    fn default() -> Self {
        TcpConfig {
            nodelay: default_nodelay(),
            keepalive_secs: default_keepalive_secs(),
            keepalive_interval: default_keepalive_interval(),
            connect_timeout: default_connect_timeout(),
            read_timeout: None,
            write_timeout: None,
        }
    }
}

impl TcpConfig {
    /// Connect timeout as a duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.connect_timeout == 0 {
            return Err("connect_timeout must be greater than 0".to_string());
        }
        if self.read_timeout == Some(0) || self.write_timeout == Some(0) {
            return Err("read_timeout and write_timeout must be greater than 0 when set".to_string());
        }
        Ok(())
    }
}
