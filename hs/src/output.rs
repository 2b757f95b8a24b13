//! Text and JSON rendering for command results.
//!
//! Text mode writes one tab-separated row per record so output stays easy
//! to pipe through `cut`/`awk`; JSON mode writes one object per line.

use std::io::Write;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use hyperspace::reseller::Quote;
use hyperspace::rewards::{claimable_milestones, referral_link};
use hyperspace::utils::relative_time;
use hyperspace::{Catalog, Currency, Outcome, User, MILESTONES};

use crate::error::Result;

fn line<W: Write>(w: &mut W, text: &str) -> Result<()> {
    writeln!(w, "{text}")?;
    Ok(())
}

fn json_line<W: Write>(w: &mut W, value: &Value) -> Result<()> {
    serde_json::to_writer(&mut *w, value)?;
    writeln!(w)?;
    Ok(())
}

fn outcome_json(outcome: &Outcome) -> Result<Value> {
    Ok(match outcome {
        Outcome::Auth(step) => json!({ "step": step.to_string() }),
        Outcome::SignedIn { username } => json!({ "signedIn": username }),
        Outcome::SignedOut => json!({ "signedOut": true }),
        Outcome::Screen(screen) => json!({ "screen": screen }),
        Outcome::Transaction(tx) => serde_json::to_value(tx)?,
        Outcome::DataClaimed { mb } => json!({ "claimedMB": mb }),
        Outcome::AdStarted { seconds } => json!({ "adSeconds": seconds }),
        Outcome::AdReward { hy } => json!({ "rewardHY": hy }),
        Outcome::AdCancelled => json!({ "adCancelled": true }),
        Outcome::Milestone(m) => serde_json::to_value(m)?,
        Outcome::Converted { mb, hy } => json!({ "convertedMB": mb, "rewardHY": hy }),
        Outcome::ResellerEnabled => json!({ "isReseller": true }),
        Outcome::MarkupSet(markup) => json!({ "resellerMarkup": markup }),
        Outcome::Purchase(p) => json!({
            "productId": p.product_id,
            "phone": p.phone,
            "price": p.quote.price,
            "profit": p.quote.profit,
            "transaction": p.transaction,
        }),
        Outcome::Profile => json!({ "profileUpdated": true }),
        Outcome::Youtube(linked) => json!({ "youtube": linked }),
        Outcome::Followers(n) => json!({ "followers": n }),
        Outcome::ThreadCreated { id } => json!({ "threadId": id }),
        Outcome::Message(m) => serde_json::to_value(m)?,
        Outcome::ThreadOpened => json!({ "opened": true }),
        Outcome::MessageDeleted => json!({ "deleted": true }),
    })
}

fn outcome_text(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Auth(step) => format!("auth step: {step}"),
        Outcome::SignedIn { username } => format!("welcome, {username}"),
        Outcome::SignedOut => "signed out".into(),
        Outcome::Screen(screen) => format!("screen: {screen:?}"),
        Outcome::Transaction(tx) => format!(
            "{}\t{:?}\t{}\t{:?}\t{}",
            tx.id,
            tx.kind,
            tx.signed_amount(),
            tx.status,
            tx.detail()
        ),
        Outcome::DataClaimed { mb } => format!("+{mb}MB Data"),
        Outcome::AdStarted { seconds } => format!("advert playing ({seconds}s)"),
        Outcome::AdReward { hy } => format!("+{hy} $HY"),
        Outcome::AdCancelled => "advert cancelled, no reward".into(),
        Outcome::Milestone(m) => format!("{}\t{}", m.label, m.reward_display()),
        Outcome::Converted { mb, hy } => format!("-{mb}MB Data\t+{hy} $HY"),
        Outcome::ResellerEnabled => "reseller mode enabled".into(),
        Outcome::MarkupSet(markup) => format!("markup: {markup}%"),
        Outcome::Purchase(p) => format!(
            "{}\t{}\t-{} NGN\tprofit {} NGN",
            p.product_id, p.phone, p.quote.price, p.quote.profit
        ),
        Outcome::Profile => "profile updated".into(),
        Outcome::Youtube(Some(y)) => {
            format!("linked {} ({} subscribers)", y.channel_name, y.subscribers)
        }
        Outcome::Youtube(None) => "youtube unlinked".into(),
        Outcome::Followers(n) => format!("followers: {n}"),
        Outcome::ThreadCreated { id } => format!("thread {id}"),
        Outcome::Message(m) => format!("{}\t{}\t{:?}\t{}", m.id, m.sender_name, m.status, m.content),
        Outcome::ThreadOpened => "thread opened".into(),
        Outcome::MessageDeleted => "message deleted".into(),
    }
}

pub fn outcome<W: Write>(w: &mut W, outcome: &Outcome, json_mode: bool) -> Result<()> {
    if json_mode {
        json_line(w, &outcome_json(outcome)?)
    } else {
        line(w, &outcome_text(outcome))
    }
}

pub fn message<W: Write>(w: &mut W, text: &str, json_mode: bool) -> Result<()> {
    if json_mode {
        json_line(w, &json!({ "text": text }))
    } else {
        line(w, text)
    }
}

pub fn error<W: Write>(w: &mut W, err: &dyn std::fmt::Display, json_mode: bool) -> Result<()> {
    if json_mode {
        json_line(w, &json!({ "error": err.to_string() }))
    } else {
        line(w, &format!("error: {err}"))
    }
}

/// Profile and balances.
pub fn status<W: Write>(w: &mut W, user: &User, json_mode: bool) -> Result<()> {
    if json_mode {
        let mut value = serde_json::to_value(user)?;
        if let Value::Object(map) = &mut value {
            // history lists have their own commands
            map.remove("rewardHistory");
            map.remove("transactions");
        }
        return json_line(w, &value);
    }
    line(w, &format!("@{}\t{}", user.username, user.referral_code))?;
    for currency in Currency::ALL {
        line(w, &format!("{currency}\t{}", user.balances.get(currency)))?;
    }
    line(w, &format!("DATA\t{}MB", user.data_balance_mb))?;
    line(
        w,
        &format!("followers\t{}\tfollowing\t{}", user.followers, user.following),
    )?;
    if user.is_reseller {
        line(
            w,
            &format!(
                "reseller\tmarkup {}%\tprofit {} NGN",
                user.reseller_markup, user.reseller_profit_ngn
            ),
        )?;
    }
    line(w, &format!("invite\t{}", referral_link(&user.username)))
}

/// Reward log, newest first.
pub fn rewards<W: Write>(w: &mut W, user: &User, now: DateTime<Utc>, json_mode: bool) -> Result<()> {
    for entry in &user.reward_history {
        if json_mode {
            json_line(w, &serde_json::to_value(entry)?)?;
        } else {
            line(
                w,
                &format!(
                    "{}\t{}\t{}",
                    entry.kind,
                    entry.amount,
                    relative_time(entry.timestamp, now)
                ),
            )?;
        }
    }
    Ok(())
}

/// Wallet ledger, newest first.
pub fn ledger<W: Write>(w: &mut W, user: &User, json_mode: bool) -> Result<()> {
    for tx in &user.transactions {
        outcome(w, &Outcome::Transaction(tx.clone()), json_mode)?;
    }
    Ok(())
}

/// Milestone table with progress and claim state.
pub fn milestones<W: Write>(w: &mut W, user: &User, json_mode: bool) -> Result<()> {
    let claimable = claimable_milestones(user);
    for m in MILESTONES.iter() {
        let state = if user.has_claimed_milestone(m.count) {
            "claimed"
        } else if claimable.iter().any(|c| c.count == m.count) {
            "ready"
        } else {
            "locked"
        };
        if json_mode {
            json_line(
                w,
                &json!({
                    "count": m.count,
                    "label": m.label,
                    "reward": m.reward_display(),
                    "progress": m.progress(user.followers),
                    "state": state,
                }),
            )?;
        } else {
            line(
                w,
                &format!(
                    "{}\t{}\t{}\t{}%\t{}",
                    m.count,
                    m.label,
                    m.reward_display(),
                    m.progress(user.followers),
                    state
                ),
            )?;
        }
    }
    Ok(())
}

pub fn quote<W: Write>(w: &mut W, product_id: &str, q: &Quote, json_mode: bool) -> Result<()> {
    if json_mode {
        json_line(
            w,
            &json!({ "productId": product_id, "cost": q.cost, "price": q.price, "profit": q.profit }),
        )
    } else {
        line(w, &format!("{product_id}\t{}\t{}\t{}", q.cost, q.price, q.profit))
    }
}

/// Product list with prices at `markup` percent.
pub fn catalog<W: Write>(
    w: &mut W,
    catalog: &Catalog,
    markup: Decimal,
    country: Option<&str>,
    json_mode: bool,
) -> Result<()> {
    for (c, op, p) in catalog.products() {
        if let Some(filter) = country {
            if !c.id.eq_ignore_ascii_case(filter) && !c.code.eq_ignore_ascii_case(filter) {
                continue;
            }
        }
        let q = Quote::new(p.cost_ngn, markup)?;
        if json_mode {
            json_line(
                w,
                &json!({
                    "country": c.code,
                    "operator": op.name,
                    "product": p,
                    "price": q.price,
                    "profit": q.profit,
                }),
            )?;
        } else {
            line(
                w,
                &format!(
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    c.code, op.name, p.id, p.name, p.data, p.validity, q.cost, q.price, q.profit
                ),
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyperspace::{Transaction, TransactionKind, TransactionStatus, UserSeed};
    use rust_decimal_macros::dec;

    fn render(o: &Outcome, json_mode: bool) -> String {
        let mut buf = Vec::new();
        outcome(&mut buf, o, json_mode).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_transaction_text_row() {
        let tx = Transaction {
            id: "tx-1".into(),
            kind: TransactionKind::Deposit,
            amount: dec!(5000),
            currency: Currency::Ngn,
            status: TransactionStatus::Completed,
            method: Some("Paystack Card".into()),
            counterparty: None,
            timestamp: Utc::now(),
        };
        assert_eq!(
            render(&Outcome::Transaction(tx), false),
            "tx-1\tDeposit\t+5000 NGN\tCompleted\tPaystack Card\n"
        );
    }

    #[test]
    fn test_json_mode_is_one_object_per_line() {
        let out = render(&Outcome::Converted { mb: 50, hy: 5 }, true);
        assert_eq!(out, "{\"convertedMB\":50,\"rewardHY\":5}\n");
    }

    #[test]
    fn test_catalog_filters_by_country() {
        let mut buf = Vec::new();
        catalog(&mut buf, &Catalog::builtin(), dec!(5), Some("us"), false).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("US\tAT&T\tp6\t"));
        // 8000 * 1.05
        assert!(text.trim_end().ends_with("8000\t8400\t400"));
    }

    #[test]
    fn test_status_lists_balances() {
        let user = UserSeed::default().into_user("neo".into(), None, None, "hermeess".into());
        let mut buf = Vec::new();
        status(&mut buf, &user, false).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("NGN\t50000\n"));
        assert!(text.contains("invite\thttps://hy.space/join/neo"));
    }
}
