use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::balance::Balances;
use super::reward::{RewardEntry, REWARD_HISTORY_CAP};
use super::transaction::Transaction;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    pub youtube: Option<String>,
    pub instagram: Option<String>,
    pub tiktok: Option<String>,
}

/// A YouTube channel linked to the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedYoutube {
    pub channel_id: String,
    pub channel_name: String,
    pub subscribers: u64,
}

/// The signed-in user: profile, social counts, balances and activity logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub referral_code: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub followers: u64,
    pub following: u64,
    pub referrals: u64,
    pub social_links: SocialLinks,
    pub youtube: Option<LinkedYoutube>,

    pub balances: Balances,
    #[serde(rename = "dataBalanceMB")]
    pub data_balance_mb: u64,
    pub last_daily_claim: Option<DateTime<Utc>>,
    pub milestones_claimed: Vec<u64>,
    /// Newest first, at most [`REWARD_HISTORY_CAP`] entries.
    pub reward_history: Vec<RewardEntry>,
    /// Wallet ledger, newest first.
    pub transactions: Vec<Transaction>,

    pub is_reseller: bool,
    pub reseller_markup: Decimal,
    #[serde(rename = "resellerProfitNGN")]
    pub reseller_profit_ngn: Decimal,
}

impl User {
    /// Prepend a reward entry, dropping the oldest past the cap.
    pub fn push_reward(&mut self, entry: RewardEntry) {
        self.reward_history.insert(0, entry);
        self.reward_history.truncate(REWARD_HISTORY_CAP);
    }

    pub fn push_transaction(&mut self, tx: Transaction) {
        self.transactions.insert(0, tx);
    }

    pub fn find_transaction_mut(&mut self, id: &str) -> Option<&mut Transaction> {
        self.transactions.iter_mut().find(|t| t.id == id)
    }

    pub fn has_claimed_milestone(&self, count: u64) -> bool {
        self.milestones_claimed.contains(&count)
    }
}

/// Demo values a freshly onboarded user starts with.
#[derive(Debug, Clone)]
pub struct UserSeed {
    pub bio: String,
    pub location: String,
    pub followers: u64,
    pub following: u64,
    pub referrals: u64,
    pub social_links: SocialLinks,
    pub balances: Balances,
    pub data_balance_mb: u64,
    pub reseller_markup: Decimal,
}

impl Default for UserSeed {
    fn default() -> Self {
        Self {
            bio: "Explorer of the HY Multiverse. Content Creator & Crypto Enthusiast.".into(),
            location: "Neo Tokyo".into(),
            followers: 1240,
            following: 850,
            referrals: 12,
            social_links: SocialLinks {
                youtube: Some("@hyper_creator".into()),
                instagram: Some("hyper.life".into()),
                tiktok: Some("hy_shorts".into()),
            },
            balances: Balances {
                ngn: Decimal::from(50_000),
                usd: Decimal::from(250),
                hy: Decimal::from(1_200),
            },
            data_balance_mb: 120,
            reseller_markup: Decimal::from(5),
        }
    }
}

impl UserSeed {
    /// Build a new user from this seed.
    pub fn into_user(
        self,
        username: String,
        email: Option<String>,
        phone: Option<String>,
        referral_code: String,
    ) -> User {
        User {
            username,
            email,
            phone,
            referral_code,
            bio: Some(self.bio),
            location: Some(self.location),
            followers: self.followers,
            following: self.following,
            referrals: self.referrals,
            social_links: self.social_links,
            youtube: None,
            balances: self.balances,
            data_balance_mb: self.data_balance_mb,
            last_daily_claim: None,
            milestones_claimed: Vec::new(),
            reward_history: Vec::new(),
            transactions: Vec::new(),
            is_reseller: false,
            reseller_markup: self.reseller_markup,
            reseller_profit_ngn: Decimal::ZERO,
        }
    }
}
