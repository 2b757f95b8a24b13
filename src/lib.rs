//! Server-side proxy for the generative-text provider.
//!
//! Holds the provider key, throttles each client with a token bucket and
//! retries transient upstream failures. Clients speak the provider's own
//! `generateContent` wire format and never see the key.

pub mod config;
pub mod error;
pub mod rate_limit;
pub mod routes;
pub mod state;

pub use config::{ProxyConfig, RateLimitConfig};
pub use error::{ProxyError, ProxyResult};
pub use rate_limit::RateLimiter;
pub use routes::create_router;
pub use state::ProxyState;
