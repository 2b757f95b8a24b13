//! End-to-end scenarios through the command API.

use chrono::{DateTime, Duration, TimeZone, Utc};
use hyperspace::*;
use rust_decimal_macros::dec;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap()
}

fn signed_in() -> AppState {
    let mut app = AppState::default();
    app.apply(Command::ChoosePhone, t0()).unwrap();
    app.apply(
        Command::SubmitPhone {
            phone: "+2348030000000".into(),
        },
        t0(),
    )
    .unwrap();
    app.apply(Command::VerifyOtp { code: "1234".into() }, t0())
        .unwrap();
    app.apply(
        Command::CompleteOnboarding {
            username: "neo".into(),
            referral: None,
        },
        t0(),
    )
    .unwrap();
    app
}

fn user(app: &AppState) -> &User {
    app.user().unwrap()
}

// ---------------------------------------------------------------------------
// Session lifecycle
// ---------------------------------------------------------------------------

#[test]
fn test_onboarding_lands_on_feed_and_logout_returns_to_landing() {
    let mut app = signed_in();
    assert_eq!(app.screen(), Screen::Feed);
    assert_eq!(user(&app).referral_code, "hermeess");
    assert!(matches!(
        app.apply(Command::ChoosePhone, t0()),
        Err(HyperError::AlreadySignedIn)
    ));

    app.apply(Command::Logout, t0()).unwrap();
    assert!(app.user().is_none());
    assert_eq!(app.screen(), Screen::Landing);
    assert!(matches!(
        app.apply(Command::ClaimDaily, t0()),
        Err(HyperError::NotSignedIn)
    ));
    assert!(matches!(
        app.apply(Command::Navigate(Screen::Dashboard), t0()),
        Err(HyperError::NotSignedIn)
    ));
}

#[test]
fn test_wrong_otp_keeps_user_signed_out() {
    let mut app = AppState::default();
    app.apply(Command::ChoosePhone, t0()).unwrap();
    app.apply(Command::SubmitPhone { phone: "0803".into() }, t0())
        .unwrap();
    let err = app
        .apply(Command::VerifyOtp { code: "9999".into() }, t0())
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid OTP");
    assert!(app.user().is_none());
}

// ---------------------------------------------------------------------------
// Wallet
// ---------------------------------------------------------------------------

#[test]
fn test_transfer_more_than_balance_is_rejected_without_mutation() {
    let mut app = signed_in();
    app.apply(
        Command::Transfer {
            amount: dec!(200),
            currency: Currency::Usd,
            target: "trinity".into(),
        },
        t0(),
    )
    .unwrap();
    assert_eq!(user(&app).balances.usd, dec!(50));

    let before = user(&app).clone();
    let err = app
        .apply(
            Command::Transfer {
                amount: dec!(100),
                currency: Currency::Usd,
                target: "trinity".into(),
            },
            t0(),
        )
        .unwrap_err();
    assert_eq!(err.to_string(), "Insufficient balance");
    assert_eq!(user(&app), &before);
}

#[test]
fn test_every_balance_change_is_on_the_ledger() {
    let mut app = signed_in();
    app.apply(
        Command::Deposit {
            amount: dec!(5000),
            currency: Currency::Ngn,
            method: None,
        },
        t0(),
    )
    .unwrap();
    let Outcome::Transaction(w) = app
        .apply(
            Command::Withdraw {
                amount: dec!(20000),
                bank: "GTBank".into(),
            },
            t0(),
        )
        .unwrap()
    else {
        panic!("expected a transaction");
    };
    assert_eq!(w.status, TransactionStatus::Pending);
    assert_eq!(user(&app).balances.ngn, dec!(55000));

    app.apply(Command::ApproveWithdrawal { id: w.id.clone() }, t0())
        .unwrap();
    assert_eq!(user(&app).balances.ngn, dec!(35000));

    let kinds: Vec<_> = user(&app).transactions.iter().map(|t| t.kind).collect();
    assert_eq!(kinds, vec![TransactionKind::Withdraw, TransactionKind::Deposit]);
}

// ---------------------------------------------------------------------------
// Rewards
// ---------------------------------------------------------------------------

#[test]
fn test_daily_claim_once_per_day() {
    let mut app = signed_in();
    app.apply(Command::ClaimDaily, t0()).unwrap();
    let err = app
        .apply(Command::ClaimDaily, t0() + Duration::hours(5))
        .unwrap_err();
    assert_eq!(err.to_string(), "Already claimed today. Come back tomorrow!");
    app.apply(Command::ClaimDaily, t0() + Duration::days(1))
        .unwrap();
    assert_eq!(user(&app).data_balance_mb, 120 + 50);
}

#[test]
fn test_ad_watch_countdown() {
    let mut app = signed_in();
    app.apply(Command::StartAd, t0()).unwrap();
    assert!(matches!(
        app.apply(Command::FinishAd, t0() + Duration::seconds(10)),
        Err(HyperError::AdNotFinished { remaining_secs: 5 })
    ));
    assert!(app.ad().is_some());

    let out = app
        .apply(Command::FinishAd, t0() + Duration::seconds(15))
        .unwrap();
    assert_eq!(out, Outcome::AdReward { hy: dec!(5) });
    assert!(app.ad().is_none());
    assert_eq!(user(&app).balances.hy, dec!(1205));
}

#[test]
fn test_convert_more_data_than_held() {
    let mut app = signed_in();
    app.apply(Command::ConvertData { mb: 75 }, t0()).unwrap();
    assert_eq!(user(&app).data_balance_mb, 45);

    let before = user(&app).clone();
    let err = app
        .apply(Command::ConvertData { mb: 50 }, t0())
        .unwrap_err();
    assert_eq!(err.to_string(), "Insufficient data balance");
    assert_eq!(user(&app), &before);
}

#[test]
fn test_milestones_follow_followers() {
    let mut app = signed_in();
    // seed has 1240 followers
    app.apply(Command::ClaimMilestone { count: 1000 }, t0())
        .unwrap();
    assert!(matches!(
        app.apply(Command::ClaimMilestone { count: 1000 }, t0()),
        Err(HyperError::MilestoneAlreadyClaimed(1000))
    ));
    assert!(matches!(
        app.apply(Command::ClaimMilestone { count: 5000 }, t0()),
        Err(HyperError::MilestoneLocked { .. })
    ));

    app.apply(Command::FollowGained(3760), t0()).unwrap();
    app.apply(Command::ClaimMilestone { count: 5000 }, t0())
        .unwrap();
    assert_eq!(user(&app).milestones_claimed, vec![1000, 5000]);
}

#[test]
fn test_reward_history_is_capped() {
    let mut app = signed_in();
    for day in 0..20 {
        app.apply(Command::ClaimDaily, t0() + Duration::days(day))
            .unwrap();
    }
    assert_eq!(user(&app).reward_history.len(), REWARD_HISTORY_CAP);
}

// ---------------------------------------------------------------------------
// Reseller
// ---------------------------------------------------------------------------

#[test]
fn test_reseller_purchase_scenario() {
    let mut app = signed_in();
    app.apply(Command::EnableReseller, t0()).unwrap();
    app.apply(
        Command::Transfer {
            amount: dec!(49000),
            currency: Currency::Ngn,
            target: "vault".into(),
        },
        t0(),
    )
    .unwrap();
    assert_eq!(user(&app).balances.ngn, dec!(1000));

    let Outcome::Purchase(p) = app
        .apply(
            Command::PurchaseData {
                product_id: "p2".into(),
                phone: "08030000000".into(),
            },
            t0(),
        )
        .unwrap()
    else {
        panic!("expected a purchase");
    };
    assert_eq!(p.quote.price, dec!(294));
    assert_eq!(p.quote.profit, dec!(14));
    assert_eq!(user(&app).balances.ngn, dec!(706));
    assert_eq!(user(&app).reseller_profit_ngn, dec!(14));
}

#[test]
fn test_overflowing_amounts_are_rejected_not_fatal() {
    let mut app = signed_in();
    let before = user(&app).clone();

    assert!(matches!(
        app.apply(
            Command::Deposit {
                amount: rust_decimal::Decimal::MAX,
                currency: Currency::Ngn,
                method: None,
            },
            t0(),
        ),
        Err(HyperError::InvalidAmount(_))
    ));
    assert_eq!(user(&app), &before);

    app.apply(Command::SetMarkup(rust_decimal::Decimal::MAX), t0())
        .unwrap();
    let marked_up = user(&app).clone();
    assert!(matches!(
        app.apply(
            Command::PurchaseData {
                product_id: "p2".into(),
                phone: "0803".into(),
            },
            t0(),
        ),
        Err(HyperError::InvalidAmount(_))
    ));
    assert_eq!(user(&app), &marked_up);
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

#[test]
fn test_thread_messages() {
    let mut app = signed_in();
    let Outcome::ThreadCreated { id } = app
        .apply(
            Command::CreateThread {
                name: "Luna Star".into(),
                kind: ThreadKind::Dm,
            },
            t0(),
        )
        .unwrap()
    else {
        panic!("expected a thread");
    };
    let Outcome::Message(m) = app
        .apply(
            Command::SendMessage {
                thread_id: id.clone(),
                text: "gm".into(),
            },
            t0(),
        )
        .unwrap()
    else {
        panic!("expected a message");
    };
    assert_eq!(m.sender_id, "neo");
    assert_eq!(m.status, MessageStatus::Sending);

    app.apply(
        Command::DeleteMessage {
            thread_id: id.clone(),
            message_id: m.id,
        },
        t0(),
    )
    .unwrap();
    assert!(app.thread(&id).unwrap().messages.is_empty());
}
