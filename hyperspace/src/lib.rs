pub mod auth;
pub mod chat;
pub mod config;
pub mod embed;
pub mod error;
pub mod ledger;
pub mod oracle;
pub mod profile;
pub mod reseller;
pub mod rewards;
pub mod store;
pub mod types;
pub mod utils;

// ---- Top-level re-exports for ergonomic usage ----

// State store + commands
pub use store::{AppState, Command, Outcome};

// Config + errors
pub use config::{OracleConfig, RetryConfig};
pub use error::{HyperError, Result};

// Auth
pub use auth::{AuthFlow, AuthStep, OtpProvider, RandomOtpProvider, StaticOtpProvider};

// Oracle
pub use oracle::{AssistantSession, Oracle, OracleClient};

// Rewards + reseller
pub use reseller::{Purchase, Quote};
pub use rewards::AdWatch;

// Core enums
pub use types::{
    Currency, MessageKind, MessageStatus, MilestoneKind, RewardKind, Screen, ThreadKind,
    TransactionKind, TransactionStatus,
};

// Account + ledger
pub use types::{Balances, LinkedYoutube, SocialLinks, Transaction, User, UserSeed};

// Rewards
pub use types::{Milestone, RewardEntry, MILESTONES, REWARD_HISTORY_CAP};

// Top-up catalog
pub use types::{Catalog, Country, Operator, Product};

// Chat
pub use types::{Message, Thread};

// Generative-text wire types
pub use types::{Candidate, Content, GenerateRequest, GenerateResponse, Part, Role};
