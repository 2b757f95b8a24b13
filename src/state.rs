use hyperspace::OracleClient;
use tracing::info;

use crate::config::ProxyConfig;
use crate::error::{ProxyError, ProxyResult};
use crate::rate_limit::RateLimiter;

/// Shared state for the proxy handlers.
pub struct ProxyState {
    pub upstream: OracleClient,
    pub limiter: RateLimiter,
}

impl ProxyState {
    /// Build state from config. Fails without an upstream key.
    pub fn new(config: &ProxyConfig) -> ProxyResult<Self> {
        if config.upstream.api_key.is_none() {
            return Err(ProxyError::Config(
                "ORACLE_API_KEY (or API_KEY) must be set".into(),
            ));
        }
        let upstream = OracleClient::new(&config.upstream)?;
        info!(
            upstream = %upstream.base_url(),
            default_model = %upstream.model(),
            burst = config.rate_limit.burst,
            per_second = config.rate_limit.per_second,
            "proxy state ready"
        );
        Ok(Self {
            upstream,
            limiter: RateLimiter::new(config.rate_limit),
        })
    }
}
