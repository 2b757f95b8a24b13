use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{MilestoneKind, RewardKind};

/// Maximum number of entries kept in a user's reward history.
pub const REWARD_HISTORY_CAP: usize = 15;

/// An entry of the reward/activity log shown on the rewards screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RewardKind,
    /// Display amount, e.g. `+25MB Data` or `+5 $HY`.
    pub amount: String,
    pub timestamp: DateTime<Utc>,
}

/// A follower-count threshold that unlocks a one-time reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Milestone {
    pub count: u64,
    pub reward: u64,
    #[serde(rename = "type")]
    pub kind: MilestoneKind,
    pub label: &'static str,
}

pub static MILESTONES: [Milestone; 4] = [
    Milestone {
        count: 100,
        reward: 50,
        kind: MilestoneKind::Hy,
        label: "100 Followers",
    },
    Milestone {
        count: 500,
        reward: 250,
        kind: MilestoneKind::Hy,
        label: "500 Followers",
    },
    Milestone {
        count: 1000,
        reward: 500,
        kind: MilestoneKind::Mb,
        label: "1K Followers",
    },
    Milestone {
        count: 5000,
        reward: 2000,
        kind: MilestoneKind::Hy,
        label: "5K Followers",
    },
];

impl Milestone {
    pub fn find(count: u64) -> Option<&'static Milestone> {
        MILESTONES.iter().find(|m| m.count == count)
    }

    /// Display string for the payout, matching the reward log format.
    pub fn reward_display(&self) -> String {
        match self.kind {
            MilestoneKind::Hy => format!("+{} $HY", self.reward),
            MilestoneKind::Mb => format!("+{}MB Data", self.reward),
        }
    }

    /// Progress towards the threshold, in percent (capped at 100).
    pub fn progress(&self, followers: u64) -> u8 {
        let pct = followers.saturating_mul(100) / self.count.max(1);
        pct.min(100) as u8
    }
}
