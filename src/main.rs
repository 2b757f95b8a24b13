mod cli;

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use hyperspace::{OracleConfig, RetryConfig};
use oracle_proxy::{create_router, ProxyConfig, ProxyResult, ProxyState, RateLimitConfig};
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() {
    let args = cli::Args::parse();

    // Initialize tracing
    let filter = args
        .log_level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .unwrap_or(tracing_subscriber::filter::LevelFilter::INFO);

    tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let _ = dotenvy::dotenv(); // load .env if present

    let config = ProxyConfig {
        bind: args.bind,
        upstream: OracleConfig {
            timeout_ms: args.timeout_ms,
            retry: RetryConfig {
                max_retries: args.max_retries,
                initial_backoff_ms: args.initial_backoff_ms,
                max_backoff_ms: args.max_backoff_ms,
            },
            ..OracleConfig::from_env()
        },
        rate_limit: RateLimitConfig {
            burst: args.burst,
            per_second: args.per_second,
            ..Default::default()
        },
    };

    let cancel = setup_signal_handlers();

    if let Err(e) = serve(config, cancel).await {
        tracing::error!(error = %e, "oracle-proxy fatal error");
        std::process::exit(1);
    }
}

async fn serve(config: ProxyConfig, cancel: CancellationToken) -> ProxyResult<()> {
    let state = Arc::new(ProxyState::new(&config)?);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(address = %config.bind, "oracle-proxy listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move { cancel.cancelled().await })
    .await?;

    info!("oracle-proxy stopped");
    Ok(())
}

/// Register SIGINT and SIGTERM handlers that trigger the returned token.
fn setup_signal_handlers() -> CancellationToken {
    let cancel = CancellationToken::new();

    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("received SIGINT, shutting down");
        cancel_clone.cancel();
    });

    #[cfg(unix)]
    {
        let cancel_clone = cancel.clone();
        tokio::spawn(async move {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                    info!("received SIGTERM, shutting down");
                    cancel_clone.cancel();
                }
                Err(e) => tracing::warn!(error = %e, "failed to register SIGTERM handler"),
            }
        });
    }

    cancel
}
