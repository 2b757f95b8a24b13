use std::net::SocketAddr;

use hyperspace::OracleConfig;

/// Token bucket settings, applied per client.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitConfig {
    /// Requests a client may burst before being throttled.
    pub burst: u32,
    /// Tokens restored per second.
    pub per_second: f64,
    /// Buckets kept before idle ones are pruned.
    pub max_clients: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            burst: 10,
            per_second: 1.0,
            max_clients: 10_000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub bind: SocketAddr,
    /// Upstream provider; `api_key` is the server-held key.
    pub upstream: OracleConfig,
    pub rate_limit: RateLimitConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8787)),
            upstream: OracleConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}
