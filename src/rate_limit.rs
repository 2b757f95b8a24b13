//! Per-client token bucket rate limiting.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::config::RateLimitConfig;
use crate::error::ProxyError;
use crate::state::ProxyState;

/// Header a client may use to get its own bucket under its socket address.
pub const CLIENT_ID_HEADER: &str = "x-client-id";

#[derive(Debug, Clone, Copy)]
struct Bucket {
    tokens: f64,
    updated: Instant,
}

#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    buckets: Mutex<HashMap<String, Bucket>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Take one token from every bucket in `keys` at `now`. Either all
    /// buckets pay or none do; returns false when any of them is empty.
    pub fn check_at(&self, keys: &[String], now: Instant) -> bool {
        let burst = f64::from(self.config.burst);
        let Ok(mut buckets) = self.buckets.lock() else {
            // poisoned: fail open
            return true;
        };

        for key in keys {
            if !buckets.contains_key(key) {
                self.make_room(&mut buckets, now);
            }
            let bucket = buckets.entry(key.clone()).or_insert(Bucket {
                tokens: burst,
                updated: now,
            });
            let elapsed = now.saturating_duration_since(bucket.updated).as_secs_f64();
            bucket.tokens = (bucket.tokens + elapsed * self.config.per_second).min(burst);
            bucket.updated = now;
        }

        if keys
            .iter()
            .any(|k| buckets.get(k).map_or(true, |b| b.tokens < 1.0))
        {
            return false;
        }
        for key in keys {
            if let Some(bucket) = buckets.get_mut(key) {
                bucket.tokens -= 1.0;
            }
        }
        true
    }

    /// Keep the map below `max_clients`: drop refilled buckets, then the
    /// least recently used ones.
    fn make_room(&self, buckets: &mut HashMap<String, Bucket>, now: Instant) {
        if buckets.len() < self.config.max_clients {
            return;
        }
        let burst = f64::from(self.config.burst);
        let per_second = self.config.per_second;
        buckets.retain(|_, b| {
            b.tokens + now.saturating_duration_since(b.updated).as_secs_f64() * per_second < burst
        });
        while buckets.len() >= self.config.max_clients.max(1) {
            let Some(oldest) = buckets
                .iter()
                .min_by_key(|(_, b)| b.updated)
                .map(|(k, _)| k.clone())
            else {
                break;
            };
            buckets.remove(&oldest);
        }
    }

    pub fn check(&self, keys: &[String]) -> bool {
        self.check_at(keys, Instant::now())
    }

    pub fn tracked_clients(&self) -> usize {
        self.buckets.lock().map(|b| b.len()).unwrap_or(0)
    }
}

/// Buckets a request is charged against.
///
/// The peer IP is always charged. An `x-client-id` header adds a second
/// bucket scoped under that IP, so rotating ids never buys extra requests.
pub fn client_keys(request: &Request) -> Vec<String> {
    let ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| format!("ip:{}", addr.ip()))
        .unwrap_or_else(|| "anonymous".to_string());
    let id = request
        .headers()
        .get(CLIENT_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|id| format!("{ip}/id:{id}"));

    let mut keys = vec![ip];
    keys.extend(id);
    keys
}

pub async fn rate_limit(
    State(state): State<Arc<ProxyState>>,
    request: Request,
    next: Next,
) -> Response {
    let keys = client_keys(&request);
    if !state.limiter.check(&keys) {
        warn!(client = %keys.join(" "), "rate limited");
        return ProxyError::RateLimited.into_response();
    }
    next.run(request).await
}
