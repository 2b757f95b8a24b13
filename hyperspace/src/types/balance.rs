use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::enums::Currency;
use crate::error::{HyperError, Result};

/// Per-currency wallet balances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balances {
    #[serde(rename = "NGN")]
    pub ngn: Decimal,
    #[serde(rename = "USD")]
    pub usd: Decimal,
    #[serde(rename = "HY")]
    pub hy: Decimal,
}

impl Balances {
    pub fn get(&self, currency: Currency) -> Decimal {
        match currency {
            Currency::Ngn => self.ngn,
            Currency::Usd => self.usd,
            Currency::Hy => self.hy,
        }
    }

    fn slot(&mut self, currency: Currency) -> &mut Decimal {
        match currency {
            Currency::Ngn => &mut self.ngn,
            Currency::Usd => &mut self.usd,
            Currency::Hy => &mut self.hy,
        }
    }

    /// Add `amount`. An overflowing credit fails and changes nothing.
    pub fn credit(&mut self, currency: Currency, amount: Decimal) -> Result<()> {
        let slot = self.slot(currency);
        *slot = slot
            .checked_add(amount)
            .ok_or(HyperError::InvalidAmount(amount))?;
        Ok(())
    }

    /// Subtract `amount`, failing without mutation if the balance is short.
    pub fn debit(&mut self, currency: Currency, amount: Decimal) -> Result<()> {
        let available = self.get(currency);
        if available < amount {
            return Err(HyperError::InsufficientBalance {
                currency,
                requested: amount,
                available,
            });
        }
        *self.slot(currency) -= amount;
        Ok(())
    }
}
