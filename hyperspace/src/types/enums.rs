use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HyperError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "NGN")]
    Ngn,
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "HY")]
    Hy,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::Ngn, Currency::Usd, Currency::Hy];

    pub fn code(self) -> &'static str {
        match self {
            Currency::Ngn => "NGN",
            Currency::Usd => "USD",
            Currency::Hy => "HY",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = HyperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('$').to_ascii_uppercase().as_str() {
            "NGN" => Ok(Currency::Ngn),
            "USD" => Ok(Currency::Usd),
            "HY" => Ok(Currency::Hy),
            other => Err(HyperError::Validation(format!("unknown currency: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Deposit,
    Withdraw,
    TransferIn,
    TransferOut,
    TopUp,
}

impl TransactionKind {
    /// Whether the row moves value into the wallet.
    pub fn is_inflow(self) -> bool {
        matches!(self, TransactionKind::Deposit | TransactionKind::TransferIn)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Completed,
    Pending,
    Failed,
    Flagged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RewardKind {
    DailyLogin,
    AdWatch,
    Milestone,
    DataConversion,
    DataPurchase,
}

impl RewardKind {
    pub fn label(self) -> &'static str {
        match self {
            RewardKind::DailyLogin => "Daily Login",
            RewardKind::AdWatch => "Ad Watch",
            RewardKind::Milestone => "Milestone",
            RewardKind::DataConversion => "Data Conversion",
            RewardKind::DataPurchase => "Data Purchase",
        }
    }
}

impl fmt::Display for RewardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What a milestone pays out in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MilestoneKind {
    Hy,
    Mb,
}

/// Top-level screen the application is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Screen {
    #[default]
    Landing,
    Feed,
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThreadKind {
    Dm,
    Group,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageKind {
    Text,
    Photo,
    Video,
    Voice,
    Doc,
    Ai,
}

/// Delivery status of a chat message. Ordered: a message only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageStatus {
    Sending,
    Delivered,
    Read,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_parse_is_case_insensitive() {
        assert_eq!("ngn".parse::<Currency>().unwrap(), Currency::Ngn);
        assert_eq!("USD".parse::<Currency>().unwrap(), Currency::Usd);
        assert_eq!("$HY".parse::<Currency>().unwrap(), Currency::Hy);
        assert!("EUR".parse::<Currency>().is_err());
    }

    #[test]
    fn test_currency_serializes_as_code() {
        assert_eq!(serde_json::to_string(&Currency::Hy).unwrap(), "\"HY\"");
        assert_eq!(
            serde_json::to_string(&TransactionKind::TransferOut).unwrap(),
            "\"TRANSFER_OUT\""
        );
    }

    #[test]
    fn test_message_status_only_moves_forward() {
        assert!(MessageStatus::Sending < MessageStatus::Delivered);
        assert!(MessageStatus::Delivered < MessageStatus::Read);
    }
}
