use std::time::Duration;

/// Default provider endpoint.
pub const DEFAULT_ORACLE_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Default model identifier.
pub const DEFAULT_ORACLE_MODEL: &str = "gemini-3-flash-preview";

/// Environment variables read by [`OracleConfig::from_env`], in lookup order
/// for the key.
pub const ENV_API_KEY: [&str; 2] = ["ORACLE_API_KEY", "API_KEY"];
pub const ENV_BASE_URL: &str = "ORACLE_BASE_URL";
pub const ENV_MODEL: &str = "ORACLE_MODEL";

/// Retry policy for calls to the generative-text provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries after the first attempt (0 disables retrying).
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent one.
    pub initial_backoff_ms: u64,
    /// Upper bound on any single delay.
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff_ms: 250,
            max_backoff_ms: 4_000,
        }
    }
}

impl RetryConfig {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Delay before retry number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(16);
        let ms = self
            .initial_backoff_ms
            .saturating_mul(factor)
            .min(self.max_backoff_ms);
        Duration::from_millis(ms)
    }
}

/// Configuration for the Oracle (generative-text) client.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// Provider or proxy base URL (e.g. `https://generativelanguage.googleapis.com`).
    pub base_url: String,
    /// API key; `None` when talking to a key-holding proxy.
    pub api_key: Option<String>,
    /// Model identifier.
    pub model: String,
    /// Per-request timeout.
    pub timeout_ms: u64,
    pub retry: RetryConfig,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ORACLE_BASE_URL.into(),
            api_key: None,
            model: DEFAULT_ORACLE_MODEL.into(),
            timeout_ms: 30_000,
            retry: RetryConfig::default(),
        }
    }
}

impl OracleConfig {
    /// Defaults overridden by `ORACLE_BASE_URL`, `ORACLE_MODEL` and
    /// `ORACLE_API_KEY` (falling back to `API_KEY`).
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(ENV_BASE_URL) {
            config.base_url = url;
        }
        if let Ok(model) = std::env::var(ENV_MODEL) {
            config.model = model;
        }
        config.api_key = ENV_API_KEY
            .iter()
            .find_map(|name| std::env::var(name).ok())
            .filter(|k| !k.trim().is_empty());
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let r = RetryConfig {
            max_retries: 5,
            initial_backoff_ms: 100,
            max_backoff_ms: 500,
        };
        assert_eq!(r.backoff(1), Duration::from_millis(100));
        assert_eq!(r.backoff(2), Duration::from_millis(200));
        assert_eq!(r.backoff(3), Duration::from_millis(400));
        assert_eq!(r.backoff(4), Duration::from_millis(500));
        assert_eq!(r.backoff(40), Duration::from_millis(500));
    }
}
