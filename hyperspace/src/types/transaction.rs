use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::enums::{Currency, TransactionKind, TransactionStatus};

/// One row of the wallet ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub currency: Currency,
    pub status: TransactionStatus,
    /// Payment rail for deposits/withdrawals (e.g. "Paystack Card", a bank name).
    pub method: Option<String>,
    /// Other party for transfers and top-ups.
    pub counterparty: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Signed display amount, e.g. `+50000 NGN` or `-200 USD`.
    pub fn signed_amount(&self) -> String {
        let sign = if self.kind.is_inflow() { '+' } else { '-' };
        format!("{sign}{} {}", self.amount, self.currency)
    }

    /// Method or counterparty, whichever describes the row.
    pub fn detail(&self) -> &str {
        self.method
            .as_deref()
            .or(self.counterparty.as_deref())
            .unwrap_or("")
    }
}
