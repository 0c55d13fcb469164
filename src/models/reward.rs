// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Reward record model.

use serde::{Deserialize, Serialize};

use super::{Attraction, VisitedLocation};

/// Proof that a user qualified for, and received points for, an attraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserReward {
    /// The visit that earned the reward
    pub visited_location: VisitedLocation,
    pub attraction: Attraction,
    pub reward_points: i32,
}

impl UserReward {
    pub fn new(visited_location: VisitedLocation, attraction: Attraction, reward_points: i32) -> Self {
        Self {
            visited_location,
            attraction,
            reward_points,
        }
    }

    /// Dedup key: one reward per attraction name, ever.
    pub fn attraction_name(&self) -> &str {
        &self.attraction.attraction_name
    }
}
