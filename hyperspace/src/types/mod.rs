pub mod balance;
pub mod catalog;
pub mod chat;
pub mod enums;
pub mod oracle;
pub mod reward;
pub mod transaction;
pub mod user;

pub use balance::Balances;
pub use catalog::{Catalog, Country, Operator, Product};
pub use chat::{Message, Thread};
pub use enums::{
    Currency, MessageKind, MessageStatus, MilestoneKind, RewardKind, Screen, ThreadKind,
    TransactionKind, TransactionStatus,
};
pub use oracle::{Candidate, Content, GenerateRequest, GenerateResponse, Part, Role};
pub use reward::{Milestone, RewardEntry, MILESTONES, REWARD_HISTORY_CAP};
pub use transaction::Transaction;
pub use user::{LinkedYoutube, SocialLinks, User, UserSeed};
