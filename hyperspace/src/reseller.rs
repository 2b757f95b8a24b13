//! Reseller pricing and data top-up purchases.
//!
//! A reseller sells catalog products at `ceil(cost * (1 + markup / 100))`
//! NGN and keeps the difference as profit.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::error::{HyperError, Result};
use crate::types::{
    Catalog, Currency, RewardEntry, RewardKind, Transaction, TransactionKind, TransactionStatus,
    User,
};
use crate::utils::new_id;

/// Sell price for a wholesale cost under `markup` percent, rounded up to a
/// whole unit.
///
/// Markups large enough to overflow `Decimal` fail with `InvalidAmount`.
pub fn price(cost: Decimal, markup: Decimal) -> Result<Decimal> {
    markup
        .checked_div(Decimal::ONE_HUNDRED)
        .and_then(|m| m.checked_add(Decimal::ONE))
        .and_then(|factor| cost.checked_mul(factor))
        .map(|p| p.ceil())
        .ok_or(HyperError::InvalidAmount(markup))
}

pub fn profit(cost: Decimal, markup: Decimal) -> Result<Decimal> {
    price(cost, markup)?
        .checked_sub(cost)
        .ok_or(HyperError::InvalidAmount(markup))
}

/// Price breakdown shown by the profit simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub cost: Decimal,
    pub price: Decimal,
    pub profit: Decimal,
}

impl Quote {
    pub fn new(cost: Decimal, markup: Decimal) -> Result<Self> {
        let price = price(cost, markup)?;
        let profit = price
            .checked_sub(cost)
            .ok_or(HyperError::InvalidAmount(markup))?;
        Ok(Self {
            cost,
            price,
            profit,
        })
    }
}

/// Result of a completed top-up.
#[derive(Debug, Clone, PartialEq)]
pub struct Purchase {
    pub product_id: String,
    pub phone: String,
    pub quote: Quote,
    pub transaction: Transaction,
}

pub fn quote(catalog: &Catalog, product_id: &str, markup: Decimal) -> Result<Quote> {
    let product = catalog.find_product(product_id)?;
    Quote::new(product.cost_ngn, markup)
}

/// Set the user's markup percentage. Any value is accepted.
pub fn set_markup(user: &mut User, markup: Decimal) {
    info!(old = %user.reseller_markup, new = %markup, "reseller markup updated");
    user.reseller_markup = markup;
}

/// Turn on reseller mode.
pub fn enable_reseller(user: &mut User) {
    user.is_reseller = true;
    info!(username = %user.username, "reseller mode enabled");
}

/// Buy a data bundle for `phone`, charging the marked-up price in NGN.
pub fn purchase(
    user: &mut User,
    catalog: &Catalog,
    product_id: &str,
    phone: &str,
    now: DateTime<Utc>,
) -> Result<Purchase> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Err(HyperError::MissingField("phone number"));
    }
    let product = catalog.find_product(product_id)?;
    let quote = Quote::new(product.cost_ngn, user.reseller_markup)?;
    if quote.price <= Decimal::ZERO {
        return Err(HyperError::InvalidAmount(quote.price));
    }
    let profit_total = user
        .reseller_profit_ngn
        .checked_add(quote.profit)
        .ok_or(HyperError::InvalidAmount(quote.profit))?;

    user.balances.debit(Currency::Ngn, quote.price)?;
    user.reseller_profit_ngn = profit_total;

    user.push_reward(RewardEntry {
        id: new_id("topup"),
        kind: RewardKind::DataPurchase,
        amount: format!("-{} NGN", quote.price),
        timestamp: now,
    });
    let transaction = Transaction {
        id: new_id("tx"),
        kind: TransactionKind::TopUp,
        amount: quote.price,
        currency: Currency::Ngn,
        status: TransactionStatus::Completed,
        method: Some(product.name.clone()),
        counterparty: Some(phone.to_string()),
        timestamp: now,
    };
    user.push_transaction(transaction.clone());

    info!(
        product = %product.id,
        phone,
        price = %quote.price,
        profit = %quote.profit,
        "data delivered"
    );

    Ok(Purchase {
        product_id: product.id.clone(),
        phone: phone.to_string(),
        quote,
        transaction,
    })
}
