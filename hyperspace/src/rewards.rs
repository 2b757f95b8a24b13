//! Reward engine: daily claim, ad watch, follower milestones and
//! data-to-token conversion.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::info;

use crate::error::{HyperError, Result};
use crate::types::{Currency, Milestone, MilestoneKind, RewardEntry, RewardKind, User};
use crate::utils::{new_id, same_calendar_day};

/// Data credited by the daily claim.
pub const DAILY_REWARD_MB: u64 = 25;
/// Tokens credited for a completed advert.
pub const AD_REWARD_HY: u64 = 5;
/// How long an advert must play before it pays out.
pub const AD_DURATION_SECS: i64 = 15;
/// Conversion rate: this many MB buy one HY.
pub const MB_PER_HY: u64 = 10;

/// Base URL for referral invites.
pub const REFERRAL_BASE_URL: &str = "https://hy.space/join";

/// An advert that has started playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdWatch {
    pub started_at: DateTime<Utc>,
}

impl AdWatch {
    /// Seconds left before the advert can be redeemed (0 once finished).
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> i64 {
        let elapsed = (now - self.started_at).num_seconds();
        (AD_DURATION_SECS - elapsed).max(0)
    }
}

fn credit_data(user: &mut User, mb: u64) -> Result<()> {
    user.data_balance_mb = user
        .data_balance_mb
        .checked_add(mb)
        .ok_or(HyperError::InvalidAmount(Decimal::from(mb)))?;
    Ok(())
}

fn record(user: &mut User, kind: RewardKind, amount: String, now: DateTime<Utc>) {
    user.push_reward(RewardEntry {
        id: new_id("rew"),
        kind,
        amount,
        timestamp: now,
    });
}

/// Credit the daily data bonus, at most once per calendar day.
pub fn claim_daily(user: &mut User, now: DateTime<Utc>) -> Result<u64> {
    if let Some(last) = user.last_daily_claim {
        if same_calendar_day(last, now) {
            return Err(HyperError::DailyCooldown);
        }
    }

    credit_data(user, DAILY_REWARD_MB)?;
    user.last_daily_claim = Some(now);
    record(
        user,
        RewardKind::DailyLogin,
        format!("+{DAILY_REWARD_MB}MB Data"),
        now,
    );

    info!(mb = DAILY_REWARD_MB, data_balance_mb = user.data_balance_mb, "daily bonus claimed");
    Ok(DAILY_REWARD_MB)
}

/// Start the advert timer.
pub fn start_ad(now: DateTime<Utc>) -> AdWatch {
    AdWatch { started_at: now }
}

/// Redeem a finished advert for [`AD_REWARD_HY`] tokens.
pub fn finish_ad(user: &mut User, watch: AdWatch, now: DateTime<Utc>) -> Result<Decimal> {
    let remaining_secs = watch.remaining_secs(now);
    if remaining_secs > 0 {
        return Err(HyperError::AdNotFinished { remaining_secs });
    }

    let reward = Decimal::from(AD_REWARD_HY);
    user.balances.credit(Currency::Hy, reward)?;
    record(user, RewardKind::AdWatch, format!("+{AD_REWARD_HY} $HY"), now);

    info!(hy = AD_REWARD_HY, "ad reward received");
    Ok(reward)
}

/// Unlock the one-time reward for the milestone at `count` followers.
pub fn claim_milestone(user: &mut User, count: u64, now: DateTime<Utc>) -> Result<&'static Milestone> {
    let milestone = Milestone::find(count).ok_or(HyperError::MilestoneNotFound(count))?;
    if user.followers < milestone.count {
        return Err(HyperError::MilestoneLocked {
            count,
            remaining: milestone.count - user.followers,
        });
    }
    if user.has_claimed_milestone(count) {
        return Err(HyperError::MilestoneAlreadyClaimed(count));
    }

    match milestone.kind {
        MilestoneKind::Hy => user
            .balances
            .credit(Currency::Hy, Decimal::from(milestone.reward))?,
        MilestoneKind::Mb => credit_data(user, milestone.reward)?,
    }
    user.milestones_claimed.push(count);
    record(user, RewardKind::Milestone, milestone.reward_display(), now);

    info!(count, reward = %milestone.reward_display(), "milestone unlocked");
    Ok(milestone)
}

/// Milestones the user could claim right now.
pub fn claimable_milestones(user: &User) -> Vec<&'static Milestone> {
    crate::types::MILESTONES
        .iter()
        .filter(|m| user.followers >= m.count && !user.has_claimed_milestone(m.count))
        .collect()
}

/// Tokens `mb` megabytes convert to, ignoring balances.
pub fn hy_for_mb(mb: u64) -> u64 {
    mb / MB_PER_HY
}

/// Convert data balance to HY at [`MB_PER_HY`] MB per token.
///
/// The whole `mb` amount is debited; any remainder below a full token is
/// not refunded.
pub fn convert_data(user: &mut User, mb: u64, now: DateTime<Utc>) -> Result<u64> {
    if mb == 0 {
        return Err(HyperError::InvalidAmount(Decimal::ZERO));
    }
    if user.data_balance_mb < mb {
        return Err(HyperError::InsufficientData {
            requested: mb,
            available: user.data_balance_mb,
        });
    }
    let hy = hy_for_mb(mb);
    if hy == 0 {
        return Err(HyperError::BelowMinimumConversion);
    }

    user.balances.credit(Currency::Hy, Decimal::from(hy))?;
    user.data_balance_mb -= mb;
    record(user, RewardKind::DataConversion, format!("+{hy} $HY"), now);

    info!(mb, hy, "converted data to HY");
    Ok(hy)
}

pub fn referral_link(username: &str) -> String {
    format!("{REFERRAL_BASE_URL}/{username}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UserSeed;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn user() -> User {
        let mut u = UserSeed::default().into_user("neo".into(), None, None, "hermeess".into());
        u.data_balance_mb = 0;
        u.balances.hy = Decimal::ZERO;
        u.followers = 0;
        u
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_daily_claim_once_per_calendar_day() {
        let mut u = user();
        assert_eq!(claim_daily(&mut u, noon()).unwrap(), 25);
        assert!(matches!(
            claim_daily(&mut u, noon() + Duration::hours(11)),
            Err(HyperError::DailyCooldown)
        ));
        assert_eq!(u.data_balance_mb, 25);
        assert_eq!(u.reward_history.len(), 1);

        // Next calendar day, even though less than 24h later.
        claim_daily(&mut u, noon() + Duration::hours(13)).unwrap();
        assert_eq!(u.data_balance_mb, 50);
    }

    #[test]
    fn test_ad_pays_only_after_countdown() {
        let mut u = user();
        let watch = start_ad(noon());
        let err = finish_ad(&mut u, watch, noon() + Duration::seconds(10)).unwrap_err();
        assert!(matches!(err, HyperError::AdNotFinished { remaining_secs: 5 }));
        assert_eq!(u.balances.hy, Decimal::ZERO);

        finish_ad(&mut u, watch, noon() + Duration::seconds(15)).unwrap();
        assert_eq!(u.balances.hy, dec!(5));
        assert_eq!(u.reward_history[0].amount, "+5 $HY");
    }

    #[test]
    fn test_milestone_locked_then_claimed_once() {
        let mut u = user();
        u.followers = 99;
        assert!(matches!(
            claim_milestone(&mut u, 100, noon()),
            Err(HyperError::MilestoneLocked { remaining: 1, .. })
        ));
        assert!(u.milestones_claimed.is_empty());

        u.followers = 1240;
        claim_milestone(&mut u, 100, noon()).unwrap();
        assert_eq!(u.balances.hy, dec!(50));
        assert!(matches!(
            claim_milestone(&mut u, 100, noon()),
            Err(HyperError::MilestoneAlreadyClaimed(100))
        ));
        assert_eq!(u.milestones_claimed, vec![100]);
        assert_eq!(u.balances.hy, dec!(50));
    }

    #[test]
    fn test_mb_milestone_credits_data() {
        let mut u = user();
        u.followers = 1000;
        claim_milestone(&mut u, 1000, noon()).unwrap();
        assert_eq!(u.data_balance_mb, 500);
        assert_eq!(u.reward_history[0].amount, "+500MB Data");
    }

    #[test]
    fn test_overflowing_rewards_leave_user_unchanged() {
        let mut u = user();
        u.balances.hy = Decimal::MAX;
        u.data_balance_mb = 100;
        let before = u.clone();
        assert!(matches!(
            finish_ad(&mut u, start_ad(noon()), noon() + Duration::seconds(15)),
            Err(HyperError::InvalidAmount(_))
        ));
        assert!(convert_data(&mut u, 100, noon()).is_err());
        assert_eq!(u, before);

        u.data_balance_mb = u64::MAX;
        let before = u.clone();
        assert!(claim_daily(&mut u, noon()).is_err());
        assert_eq!(u, before);
    }

    #[test]
    fn test_unknown_milestone() {
        let mut u = user();
        u.followers = 10_000;
        assert!(matches!(
            claim_milestone(&mut u, 250, noon()),
            Err(HyperError::MilestoneNotFound(250))
        ));
    }

    #[test]
    fn test_claimable_milestones() {
        let mut u = user();
        u.followers = 1240;
        u.milestones_claimed = vec![500];
        let counts: Vec<u64> = claimable_milestones(&u).iter().map(|m| m.count).collect();
        assert_eq!(counts, vec![100, 1000]);
    }

    #[test]
    fn test_convert_data_floors() {
        for mb in [10u64, 19, 45, 100, 1234] {
            let mut u = user();
            u.data_balance_mb = 5000;
            let hy = convert_data(&mut u, mb, noon()).unwrap();
            assert_eq!(hy, mb / 10);
            assert_eq!(u.data_balance_mb, 5000 - mb);
            assert_eq!(u.balances.hy, Decimal::from(mb / 10));
        }
    }

    #[test]
    fn test_convert_below_minimum_is_rejected() {
        for mb in 1..10u64 {
            let mut u = user();
            u.data_balance_mb = 100;
            let before = u.clone();
            assert!(matches!(
                convert_data(&mut u, mb, noon()),
                Err(HyperError::BelowMinimumConversion)
            ));
            assert_eq!(u, before);
        }
    }

    #[test]
    fn test_convert_more_than_balance() {
        let mut u = user();
        u.data_balance_mb = 45;
        let before = u.clone();
        let err = convert_data(&mut u, 50, noon()).unwrap_err();
        assert_eq!(err.to_string(), "Insufficient data balance");
        assert_eq!(u, before);
    }

    #[test]
    fn test_history_capped_after_many_rewards() {
        let mut u = user();
        let mut now = noon();
        for _ in 0..20 {
            claim_daily(&mut u, now).unwrap();
            now += Duration::days(1);
        }
        assert_eq!(u.reward_history.len(), 15);
        assert_eq!(u.data_balance_mb, 500);
    }

    #[test]
    fn test_referral_link() {
        assert_eq!(referral_link("neo"), "https://hy.space/join/neo");
    }
}
