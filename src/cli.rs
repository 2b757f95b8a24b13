use std::net::SocketAddr;

use clap::Parser;

/// oracle-proxy — key-holding, rate-limited proxy for the HY Oracle.
///
/// Upstream settings come from the environment (`ORACLE_API_KEY` or
/// `API_KEY`, `ORACLE_BASE_URL`, `ORACLE_MODEL`), optionally via `.env`.
#[derive(Parser, Debug)]
#[command(name = "oracle-proxy", version)]
pub struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8787")]
    pub bind: SocketAddr,

    /// Requests a client may burst
    #[arg(long, default_value = "10")]
    pub burst: u32,

    /// Sustained requests per second per client
    #[arg(long, default_value = "1.0")]
    pub per_second: f64,

    /// Upstream retries on 429/5xx/transport errors
    #[arg(long, default_value = "2")]
    pub max_retries: u32,

    /// Initial retry backoff (ms); doubles per retry
    #[arg(long, default_value = "250")]
    pub initial_backoff_ms: u64,

    /// Backoff cap (ms)
    #[arg(long, default_value = "4000")]
    pub max_backoff_ms: u64,

    /// Upstream request timeout (ms)
    #[arg(long, default_value = "30000")]
    pub timeout_ms: u64,
}
