//! Endpoint identity with DNS caching
//!
//! Provides the fixed (host, port) identity of a pool and resolution with a
//! cached result to reduce DNS lookups.

use anyhow::{anyhow, Context, Result};
use std::fmt;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::{Arc, PoisonError, RwLock};

/// Remote endpoint a pool connects to
///
/// Equality and display only consider host and port; the resolution cache is
/// shared between clones.
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// Host name or IP address
    host: String,
    /// TCP port
    port: u16,
    /// Cached resolved address
    cached: Arc<RwLock<Option<SocketAddr>>>,
}

impl Endpoint {
    /// Create a new endpoint without cached resolution
    pub fn new(host: &str, port: u16) -> Self {
        Endpoint {
            host: host.to_string(),
            port,
            cached: Arc::new(RwLock::new(None)),
        }
    }

    /// Create an endpoint that is already resolved
    pub fn from_socket_addr(addr: SocketAddr) -> Self {
        Endpoint {
            host: addr.ip().to_string(),
            port: addr.port(),
            cached: Arc::new(RwLock::new(Some(addr))),
        }
    }

    /// Host name or IP address
    pub fn host(&self) -> &str {
        &self.host
    }

    /// TCP port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get the cached address if available
    pub fn get_cached(&self) -> Option<SocketAddr> {
        *self.cached.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clear the cached address
    pub fn clear_cache(&self) {
        *self.cached.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Resolve the endpoint, using the cache if available
    pub fn resolve(&self) -> Result<SocketAddr> {
        if let Some(cached) = self.get_cached() {
            return Ok(cached);
        }

        let resolved = self.resolve_fresh()?;
        *self.cached.write().unwrap_or_else(PoisonError::into_inner) = Some(resolved);

        Ok(resolved)
    }

    /// Resolve the endpoint without using the cache
    pub fn resolve_fresh(&self) -> Result<SocketAddr> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .with_context(|| format!("Failed to resolve {}", self))?
            .next()
            .ok_or_else(|| anyhow!("No addresses found for {}", self))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl PartialEq for Endpoint {
    fn eq(&self, other: &Self) -> bool {
        self.host == other.host && self.port == other.port
    }
}

impl Eq for Endpoint {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_display() {
        let endpoint = Endpoint::new("example.com", 8080);
        assert_eq!(endpoint.to_string(), "example.com:8080");
        assert_eq!(endpoint.host(), "example.com");
        assert_eq!(endpoint.port(), 8080);
    }

    #[test]
    fn test_endpoint_with_socket_addr() {
        let addr: SocketAddr = "127.0.0.1:8080".parse().unwrap();
        let endpoint = Endpoint::from_socket_addr(addr);
        assert_eq!(endpoint.get_cached(), Some(addr));
        assert_eq!(endpoint.resolve().unwrap(), addr);
    }

    #[test]
    fn test_resolve_caches_result() {
        let endpoint = Endpoint::new("127.0.0.1", 9000);
        assert!(endpoint.get_cached().is_none());

        let resolved = endpoint.resolve().unwrap();
        assert_eq!(resolved, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(endpoint.get_cached(), Some(resolved));

        endpoint.clear_cache();
        assert!(endpoint.get_cached().is_none());
    }

    #[test]
    fn test_clone_shares_cache() {
        let endpoint = Endpoint::new("127.0.0.1", 9001);
        let clone = endpoint.clone();
        endpoint.resolve().unwrap();
        assert!(clone.get_cached().is_some());
        assert_eq!(endpoint, clone);
    }

    #[test]
    fn test_equality_ignores_cache() {
        let addr: SocketAddr = "127.0.0.1:80".parse().unwrap();
        assert_eq!(Endpoint::new("127.0.0.1", 80), Endpoint::from_socket_addr(addr));
        assert_ne!(Endpoint::new("127.0.0.1", 80), Endpoint::new("127.0.0.1", 81));
    }
}
