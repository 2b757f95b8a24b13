use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;

/// hs — command-line client for HYPER SPACE.
#[derive(Parser, Debug)]
#[command(name = "hs", version)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start an interactive session (sign in, wallet, rewards, reseller, chat)
    Shell(ShellArgs),

    /// Ask the Oracle a one-shot question
    Ask(AskArgs),

    /// Translate text with the Oracle
    Translate(TranslateArgs),

    /// Summarize text with the Oracle
    Summarize(SummarizeArgs),

    /// List top-up products with reseller prices
    Catalog(CatalogArgs),

    /// Print the embeddable player URL for a video
    Embed(EmbedArgs),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpMode {
    /// Accept the fixed demo code
    Static,
    /// Issue a random code per phone number (printed to the log)
    Random,
}

/// Arguments for the `shell` subcommand.
#[derive(Parser, Debug)]
pub struct ShellArgs {
    /// How one-time passcodes are issued
    #[arg(long, value_enum, default_value = "static")]
    pub otp: OtpMode,

    /// Code accepted in static OTP mode
    #[arg(long, default_value = "1234")]
    pub otp_code: String,
}

/// Arguments for the `ask` subcommand.
#[derive(Parser, Debug)]
pub struct AskArgs {
    /// Question for the Oracle
    #[arg(required = true)]
    pub prompt: Vec<String>,
}

/// Arguments for the `translate` subcommand.
#[derive(Parser, Debug)]
pub struct TranslateArgs {
    /// Target language
    #[arg(long, default_value = "English")]
    pub to: String,

    #[arg(required = true)]
    pub text: Vec<String>,
}

/// Arguments for the `summarize` subcommand.
#[derive(Parser, Debug)]
pub struct SummarizeArgs {
    #[arg(required = true)]
    pub text: Vec<String>,
}

/// Arguments for the `catalog` subcommand.
#[derive(Parser, Debug)]
pub struct CatalogArgs {
    /// Reseller markup in percent
    #[arg(long, default_value = "5", allow_hyphen_values = true)]
    pub markup: Decimal,

    /// Only show one country (id or code, e.g. NG)
    #[arg(long)]
    pub country: Option<String>,
}

/// Arguments for the `embed` subcommand.
#[derive(Parser, Debug)]
pub struct EmbedArgs {
    /// 11-character video id
    pub video_id: String,
}
