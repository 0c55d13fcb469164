//! User model with its position history and reward ledger.
//!
//! Both collections are shared between the background tracker and batch
//! reward passes, so they sit behind locks and are only exposed as snapshots.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use uuid::Uuid;

use super::{UserReward, VisitedLocation};

/// A tracked user.
#[derive(Debug)]
pub struct User {
    pub user_id: Uuid,
    /// Unique user name (registry key)
    pub user_name: String,
    pub phone_number: String,
    pub email_address: String,
    /// Append-only, in sampling order
    visited_locations: RwLock<Vec<VisitedLocation>>,
    /// At most one entry per attraction name
    rewards: RwLock<Vec<UserReward>>,
}

impl User {
    pub fn new(
        user_id: Uuid,
        user_name: impl Into<String>,
        phone_number: impl Into<String>,
        email_address: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            user_name: user_name.into(),
            phone_number: phone_number.into(),
            email_address: email_address.into(),
            visited_locations: RwLock::new(Vec::new()),
            rewards: RwLock::new(Vec::new()),
        }
    }

    pub fn add_to_visited_locations(&self, visited_location: VisitedLocation) {
        write(&self.visited_locations).push(visited_location);
    }

    /// Stable copy of the position history.
    pub fn visited_locations(&self) -> Vec<VisitedLocation> {
        read(&self.visited_locations).clone()
    }

    pub fn last_visited_location(&self) -> Option<VisitedLocation> {
        read(&self.visited_locations).last().cloned()
    }

    pub fn clear_visited_locations(&self) {
        write(&self.visited_locations).clear();
    }

    /// Append a reward unless one already exists for the same attraction name.
    ///
    /// Returns `true` if the reward was added, `false` if it was a duplicate.
    /// The check and the push happen under one write guard.
    pub fn add_user_reward(&self, reward: UserReward) -> bool {
        let mut rewards = write(&self.rewards);
        if rewards
            .iter()
            .any(|r| r.attraction_name() == reward.attraction_name())
        {
            return false;
        }
        rewards.push(reward);
        true
    }

    pub fn user_rewards(&self) -> Vec<UserReward> {
        read(&self.rewards).clone()
    }

    pub fn has_reward_for(&self, attraction_name: &str) -> bool {
        read(&self.rewards)
            .iter()
            .any(|r| r.attraction_name() == attraction_name)
    }

    /// Names of all attractions this user has been rewarded for.
    pub fn rewarded_attraction_names(&self) -> Vec<String> {
        read(&self.rewards)
            .iter()
            .map(|r| r.attraction_name().to_string())
            .collect()
    }

    pub fn total_reward_points(&self) -> i64 {
        read(&self.rewards)
            .iter()
            .map(|r| i64::from(r.reward_points))
            .sum()
    }
}

// A panic while holding a guard cannot leave a half-written element behind:
// every mutation is a single push or clear, so the data stays usable.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
