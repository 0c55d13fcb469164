// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Simulated collaborators and internal test users.
//!
//! These stand in for the live GPS and rewards systems when running the
//! demo binary or load tests.

use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use crate::models::{Location, User, VisitedLocation};
use crate::services::sources::{PositionSource, RewardPointSource};

/// Latitude bound of the Web Mercator projection.
const MAX_LATITUDE: f64 = 85.05112878;
/// Historical samples generated per internal user.
const HISTORY_LENGTH: usize = 3;
/// Historical samples fall within this many days before now.
const HISTORY_DAYS: i64 = 30;

/// Random delay in `[min, max]`; zero when `max` is zero.
fn random_latency(min: Duration, max: Duration) -> Duration {
    if max.is_zero() || max <= min {
        return max;
    }
    rand::thread_rng().gen_range(min..=max)
}

fn random_location<G: Rng>(rng: &mut G) -> Location {
    Location::new(
        rng.gen_range(-MAX_LATITUDE..=MAX_LATITUDE),
        rng.gen_range(-180.0..=180.0),
    )
}

/// GPS stand-in returning a random position after a random delay.
#[derive(Debug, Clone)]
pub struct SimulatedGps {
    pub min_latency: Duration,
    pub max_latency: Duration,
}

impl Default for SimulatedGps {
    fn default() -> Self {
        Self {
            min_latency: Duration::from_millis(30),
            max_latency: Duration::from_millis(100),
        }
    }
}

impl SimulatedGps {
    /// Responds immediately.
    pub fn instant() -> Self {
        Self {
            min_latency: Duration::ZERO,
            max_latency: Duration::ZERO,
        }
    }
}

impl PositionSource for SimulatedGps {
    async fn current_position(&self, user_id: Uuid) -> anyhow::Result<VisitedLocation> {
        tokio::time::sleep(random_latency(self.min_latency, self.max_latency)).await;
        let location = random_location(&mut rand::thread_rng());
        Ok(VisitedLocation::now(user_id, location))
    }
}

/// Rewards stand-in returning random points after a random delay.
#[derive(Debug, Clone)]
pub struct SimulatedRewardCentral {
    pub min_latency: Duration,
    pub max_latency: Duration,
}

impl Default for SimulatedRewardCentral {
    fn default() -> Self {
        Self {
            min_latency: Duration::from_millis(1),
            max_latency: Duration::from_millis(1000),
        }
    }
}

impl SimulatedRewardCentral {
    /// Responds immediately.
    pub fn instant() -> Self {
        Self {
            min_latency: Duration::ZERO,
            max_latency: Duration::ZERO,
        }
    }
}

impl RewardPointSource for SimulatedRewardCentral {
    async fn attraction_reward_points(
        &self,
        _attraction_id: Uuid,
        _user_id: Uuid,
    ) -> anyhow::Result<i32> {
        tokio::time::sleep(random_latency(self.min_latency, self.max_latency)).await;
        Ok(rand::thread_rng().gen_range(1..=1000))
    }
}

/// Users named `internalUser{i}`, each with a short random position history.
pub fn generate_internal_users(count: usize) -> Vec<User> {
    let mut rng = rand::thread_rng();
    let users: Vec<User> = (0..count)
        .map(|i| {
            let user_name = format!("internalUser{}", i);
            let email = format!("{}@tourGuide.com", user_name);
            let user = User::new(Uuid::new_v4(), user_name, "000", email);

            for _ in 0..HISTORY_LENGTH {
                let days_ago = rng.gen_range(0..HISTORY_DAYS);
                user.add_to_visited_locations(VisitedLocation::new(
                    user.user_id,
                    random_location(&mut rng),
                    Utc::now() - chrono::Duration::days(days_ago),
                ));
            }
            user
        })
        .collect();

    tracing::debug!(count = users.len(), "Created internal test users");
    users
}
