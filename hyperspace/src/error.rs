use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::Currency;

#[derive(Error, Debug)]
pub enum HyperError {
    // --- Transport ---
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    // --- Session ---
    #[error("not signed in")]
    NotSignedIn,

    #[error("already signed in")]
    AlreadySignedIn,

    #[error("Invalid OTP")]
    InvalidOtp,

    #[error("Username too short")]
    UsernameTooShort,

    #[error("auth flow cannot {action} from step {step}")]
    AuthStep { action: &'static str, step: String },

    // --- Wallet ---
    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("{currency} is not supported for this operation")]
    UnsupportedCurrency { currency: Currency },

    #[error("Insufficient balance")]
    InsufficientBalance {
        currency: Currency,
        requested: Decimal,
        available: Decimal,
    },

    #[error("transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("withdrawal {0} is not pending")]
    WithdrawalNotPending(String),

    // --- Rewards ---
    #[error("Insufficient data balance")]
    InsufficientData { requested: u64, available: u64 },

    #[error("Minimum conversion is 10MB")]
    BelowMinimumConversion,

    #[error("Already claimed today. Come back tomorrow!")]
    DailyCooldown,

    #[error("advert still playing: {remaining_secs}s left")]
    AdNotFinished { remaining_secs: i64 },

    #[error("milestone not found: {0}")]
    MilestoneNotFound(u64),

    #[error("milestone {count} locked: {remaining} followers left")]
    MilestoneLocked { count: u64, remaining: u64 },

    #[error("milestone {0} already claimed")]
    MilestoneAlreadyClaimed(u64),

    // --- Reseller ---
    #[error("product not found: {0}")]
    ProductNotFound(String),

    // --- Chat ---
    #[error("message not found: {0}")]
    MessageNotFound(String),

    #[error("validation error: {0}")]
    Validation(String),
}

impl HyperError {
    /// Whether retrying the same request could succeed.
    ///
    /// Only transport failures qualify: throttling, upstream 5xx and
    /// connection-level errors.
    pub fn is_retryable(&self) -> bool {
        match self {
            HyperError::Http { status, .. } => *status == 429 || *status >= 500,
            HyperError::Request(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, HyperError>;
