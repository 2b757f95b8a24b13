//! Wallet ledger: deposits, transfers and withdrawal requests.
//!
//! Every operation validates first and mutates only on success, so a failed
//! call leaves the user record exactly as it was. Each successful operation
//! appends a [`Transaction`] row; the ledger is the single history of balance
//! changes.
//!
//! Withdrawals are requests: they are recorded as `Pending` and only debit
//! the NGN balance once approved with [`approve_withdrawal`]. Transfers debit
//! immediately and have no recipient-side effect.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::error::{HyperError, Result};
use crate::types::{Currency, Transaction, TransactionKind, TransactionStatus, User};
use crate::utils::new_id;

/// Payment rail label used when a deposit does not name one.
pub const DEFAULT_DEPOSIT_METHOD: &str = "Paystack Card";

fn ensure_positive(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(HyperError::InvalidAmount(amount));
    }
    Ok(())
}

fn ensure_present(value: &str, field: &'static str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(HyperError::MissingField(field));
    }
    Ok(())
}

/// Credit NGN or USD from an external payment rail.
pub fn deposit(
    user: &mut User,
    amount: Decimal,
    currency: Currency,
    method: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Transaction> {
    ensure_positive(amount)?;
    if currency == Currency::Hy {
        return Err(HyperError::UnsupportedCurrency { currency });
    }

    user.balances.credit(currency, amount)?;
    let tx = Transaction {
        id: new_id("tx"),
        kind: TransactionKind::Deposit,
        amount,
        currency,
        status: TransactionStatus::Completed,
        method: Some(method.unwrap_or(DEFAULT_DEPOSIT_METHOD).to_string()),
        counterparty: None,
        timestamp: now,
    };
    user.push_transaction(tx.clone());

    info!(%amount, %currency, balance = %user.balances.get(currency), "deposit completed");
    Ok(tx)
}

/// Send funds to another user. Debits the source balance only.
pub fn transfer(
    user: &mut User,
    amount: Decimal,
    currency: Currency,
    target: &str,
    now: DateTime<Utc>,
) -> Result<Transaction> {
    ensure_present(target, "recipient")?;
    ensure_positive(amount)?;

    user.balances.debit(currency, amount)?;
    let tx = Transaction {
        id: new_id("tx"),
        kind: TransactionKind::TransferOut,
        amount,
        currency,
        status: TransactionStatus::Completed,
        method: None,
        counterparty: Some(target.trim().to_string()),
        timestamp: now,
    };
    user.push_transaction(tx.clone());

    info!(%amount, %currency, recipient = target, "transfer completed");
    Ok(tx)
}

/// Submit an NGN withdrawal request to a bank account.
///
/// The balance is checked but not debited; the request waits for approval.
pub fn withdraw(
    user: &mut User,
    amount: Decimal,
    bank: &str,
    now: DateTime<Utc>,
) -> Result<Transaction> {
    ensure_present(bank, "bank")?;
    ensure_positive(amount)?;

    let available = user.balances.ngn;
    if available < amount {
        return Err(HyperError::InsufficientBalance {
            currency: Currency::Ngn,
            requested: amount,
            available,
        });
    }

    let tx = Transaction {
        id: new_id("tx"),
        kind: TransactionKind::Withdraw,
        amount,
        currency: Currency::Ngn,
        status: TransactionStatus::Pending,
        method: Some(bank.trim().to_string()),
        counterparty: None,
        timestamp: now,
    };
    user.push_transaction(tx.clone());

    info!(%amount, bank, id = %tx.id, "withdrawal request submitted for approval");
    Ok(tx)
}

fn pending_withdrawal<'a>(user: &'a mut User, id: &str) -> Result<&'a mut Transaction> {
    let tx = user
        .find_transaction_mut(id)
        .filter(|t| t.kind == TransactionKind::Withdraw)
        .ok_or_else(|| HyperError::TransactionNotFound(id.to_string()))?;
    if tx.status != TransactionStatus::Pending {
        return Err(HyperError::WithdrawalNotPending(id.to_string()));
    }
    Ok(tx)
}

/// Settle a pending withdrawal by debiting NGN.
///
/// If the balance no longer covers the request, the row is marked `Failed`
/// and `InsufficientBalance` is returned.
pub fn approve_withdrawal(user: &mut User, id: &str) -> Result<Transaction> {
    let amount = pending_withdrawal(user, id)?.amount;

    let debit = user.balances.debit(Currency::Ngn, amount);
    let tx = pending_withdrawal(user, id)?;
    match debit {
        Ok(()) => {
            tx.status = TransactionStatus::Completed;
            info!(id, %amount, "withdrawal approved");
            Ok(tx.clone())
        }
        Err(e) => {
            tx.status = TransactionStatus::Failed;
            warn!(id, %amount, "withdrawal failed at settlement: insufficient balance");
            Err(e)
        }
    }
}

/// Decline a pending withdrawal. No balance change.
pub fn reject_withdrawal(user: &mut User, id: &str) -> Result<Transaction> {
    let tx = pending_withdrawal(user, id)?;
    tx.status = TransactionStatus::Failed;
    info!(id, "withdrawal rejected");
    Ok(tx.clone())
}

/// Total NGN still awaiting approval.
pub fn pending_withdrawals_ngn(user: &User) -> Decimal {
    user.transactions
        .iter()
        .filter(|t| t.kind == TransactionKind::Withdraw && t.status == TransactionStatus::Pending)
        .fold(Decimal::ZERO, |total, t| total.saturating_add(t.amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Balances, UserSeed};
    use rust_decimal_macros::dec;

    fn user_with(balances: Balances) -> User {
        let mut u = UserSeed::default().into_user("neo".into(), None, None, "hermeess".into());
        u.balances = balances;
        u
    }

    #[test]
    fn test_deposit_credits_and_records() {
        let mut u = user_with(Balances::default());
        let tx = deposit(&mut u, dec!(50000), Currency::Ngn, None, Utc::now()).unwrap();
        assert_eq!(u.balances.ngn, dec!(50000));
        assert_eq!(tx.method.as_deref(), Some(DEFAULT_DEPOSIT_METHOD));
        assert_eq!(u.transactions.len(), 1);
        assert_eq!(u.transactions[0].signed_amount(), "+50000 NGN");
    }

    #[test]
    fn test_deposit_rejects_hy_and_non_positive() {
        let mut u = user_with(Balances::default());
        assert!(matches!(
            deposit(&mut u, dec!(10), Currency::Hy, None, Utc::now()),
            Err(HyperError::UnsupportedCurrency { .. })
        ));
        assert!(matches!(
            deposit(&mut u, dec!(0), Currency::Usd, None, Utc::now()),
            Err(HyperError::InvalidAmount(_))
        ));
        assert!(u.transactions.is_empty());
    }

    #[test]
    fn test_deposit_overflow_is_noop() {
        let mut u = UserSeed::default().into_user("neo".into(), None, None, "hermeess".into());
        let before = u.clone();
        assert!(matches!(
            deposit(&mut u, Decimal::MAX, Currency::Ngn, None, Utc::now()),
            Err(HyperError::InvalidAmount(_))
        ));
        assert_eq!(u, before);
    }

    #[test]
    fn test_transfer_insufficient_balance_is_noop() {
        let mut u = user_with(Balances {
            usd: dec!(50),
            ..Default::default()
        });
        let before = u.clone();
        let err = transfer(&mut u, dec!(100), Currency::Usd, "@cyber_queen", Utc::now()).unwrap_err();
        assert_eq!(err.to_string(), "Insufficient balance");
        assert_eq!(u, before);
    }

    #[test]
    fn test_transfer_debits_source_only() {
        let mut u = user_with(Balances {
            hy: dec!(120),
            ..Default::default()
        });
        let tx = transfer(&mut u, dec!(20), Currency::Hy, " @oracle_node ", Utc::now()).unwrap();
        assert_eq!(u.balances.hy, dec!(100));
        assert_eq!(tx.counterparty.as_deref(), Some("@oracle_node"));
        assert_eq!(tx.signed_amount(), "-20 HY");
    }

    #[test]
    fn test_transfer_requires_target() {
        let mut u = user_with(Balances {
            usd: dec!(50),
            ..Default::default()
        });
        assert!(matches!(
            transfer(&mut u, dec!(1), Currency::Usd, "  ", Utc::now()),
            Err(HyperError::MissingField("recipient"))
        ));
    }

    #[test]
    fn test_withdraw_is_pending_and_does_not_debit() {
        let mut u = user_with(Balances {
            ngn: dec!(20000),
            ..Default::default()
        });
        let tx = withdraw(&mut u, dec!(15000), "Access Bank", Utc::now()).unwrap();
        assert_eq!(tx.status, TransactionStatus::Pending);
        assert_eq!(u.balances.ngn, dec!(20000));
        assert_eq!(pending_withdrawals_ngn(&u), dec!(15000));
    }

    #[test]
    fn test_withdraw_insufficient_ngn() {
        let mut u = user_with(Balances {
            ngn: dec!(100),
            usd: dec!(1000),
            ..Default::default()
        });
        assert!(matches!(
            withdraw(&mut u, dec!(101), "Access Bank", Utc::now()),
            Err(HyperError::InsufficientBalance {
                currency: Currency::Ngn,
                ..
            })
        ));
        assert!(u.transactions.is_empty());
    }

    #[test]
    fn test_approve_withdrawal_debits_once() {
        let mut u = user_with(Balances {
            ngn: dec!(20000),
            ..Default::default()
        });
        let id = withdraw(&mut u, dec!(15000), "Access Bank", Utc::now()).unwrap().id;
        let settled = approve_withdrawal(&mut u, &id).unwrap();
        assert_eq!(settled.status, TransactionStatus::Completed);
        assert_eq!(u.balances.ngn, dec!(5000));
        assert!(matches!(
            approve_withdrawal(&mut u, &id),
            Err(HyperError::WithdrawalNotPending(_))
        ));
        assert_eq!(u.balances.ngn, dec!(5000));
    }

    #[test]
    fn test_approve_withdrawal_fails_when_balance_dropped() {
        let mut u = user_with(Balances {
            ngn: dec!(20000),
            ..Default::default()
        });
        let id = withdraw(&mut u, dec!(15000), "Access Bank", Utc::now()).unwrap().id;
        transfer(&mut u, dec!(10000), Currency::Ngn, "@luna", Utc::now()).unwrap();

        assert!(approve_withdrawal(&mut u, &id).is_err());
        assert_eq!(u.balances.ngn, dec!(10000));
        let row = u.transactions.iter().find(|t| t.id == id).unwrap();
        assert_eq!(row.status, TransactionStatus::Failed);
    }

    #[test]
    fn test_reject_withdrawal_and_unknown_id() {
        let mut u = user_with(Balances {
            ngn: dec!(500),
            ..Default::default()
        });
        let id = withdraw(&mut u, dec!(500), "GTBank", Utc::now()).unwrap().id;
        reject_withdrawal(&mut u, &id).unwrap();
        assert_eq!(pending_withdrawals_ngn(&u), Decimal::ZERO);
        assert_eq!(u.balances.ngn, dec!(500));
        assert!(matches!(
            reject_withdrawal(&mut u, "tx-missing"),
            Err(HyperError::TransactionNotFound(_))
        ));
    }
}
