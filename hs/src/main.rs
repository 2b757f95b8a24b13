mod cli;
mod error;
mod output;
mod shell;

use std::io::Write;

use clap::Parser;
use cli::{Command, OtpMode};
use tokio_util::sync::CancellationToken;
use tracing::info;

use hyperspace::embed::youtube_embed_url;
use hyperspace::{
    AppState, Catalog, Oracle, OracleClient, OracleConfig, OtpProvider, RandomOtpProvider,
    StaticOtpProvider, UserSeed,
};

use crate::error::Result;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // Initialize tracing
    let filter = cli
        .log_level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .unwrap_or(tracing_subscriber::filter::LevelFilter::INFO);

    tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let _ = dotenvy::dotenv(); // load .env if present

    // Shared cancellation token + signal handlers.
    let cancel = setup_signal_handlers();

    if let Err(e) = run(cli.command, cli.json, cancel).await {
        tracing::error!(error = %e, "hs failed");
        std::process::exit(1);
    }
}

fn oracle_client() -> Result<OracleClient> {
    let config = OracleConfig::from_env();
    info!(
        base_url = %config.base_url,
        model = %config.model,
        keyed = config.api_key.is_some(),
        "oracle configured"
    );
    Ok(OracleClient::new(&config)?)
}

async fn run(command: Command, json: bool, cancel: CancellationToken) -> Result<()> {
    let mut stdout = std::io::stdout();
    match command {
        Command::Shell(args) => {
            let otp: Box<dyn OtpProvider> = match args.otp {
                OtpMode::Static => Box::new(StaticOtpProvider::new(args.otp_code)),
                OtpMode::Random => Box::new(RandomOtpProvider::new()),
            };
            let app = AppState::new(otp, UserSeed::default());
            let shell = shell::Shell::new(app, Box::new(oracle_client()?), json, stdout);
            return shell.run(cancel).await;
        }

        Command::Ask(args) => {
            let oracle = oracle_client()?;
            let prompt = args.prompt.join(" ");
            let text = oracle
                .generate(hyperspace::oracle::CHAT_SYSTEM_INSTRUCTION, &prompt)
                .await?;
            output::message(&mut stdout, &text, json)?;
        }

        Command::Translate(args) => {
            let oracle = oracle_client()?;
            let text = oracle.translate(&args.text.join(" "), &args.to).await?;
            output::message(&mut stdout, &text, json)?;
        }

        Command::Summarize(args) => {
            let oracle = oracle_client()?;
            let text = oracle.summarize(&args.text.join(" ")).await?;
            output::message(&mut stdout, &text, json)?;
        }

        Command::Catalog(args) => {
            output::catalog(
                &mut stdout,
                &Catalog::builtin(),
                args.markup,
                args.country.as_deref(),
                json,
            )?;
        }

        Command::Embed(args) => {
            let url = youtube_embed_url(&args.video_id)?;
            output::message(&mut stdout, &url, json)?;
        }
    }
    stdout.flush()?;
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
