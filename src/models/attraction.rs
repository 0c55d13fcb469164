// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Attraction model: a named point of interest with fixed coordinates.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Location;

/// A point of interest users can earn rewards for.
///
/// The name is the unique key within a catalog and the reward dedup key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attraction {
    pub attraction_id: Uuid,
    /// Attraction name (e.g., "Disneyland")
    pub attraction_name: String,
    pub city: String,
    pub state: String,
    pub location: Location,
}

impl Attraction {
    pub fn new(
        attraction_id: Uuid,
        attraction_name: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        location: Location,
    ) -> Self {
        Self {
            attraction_id,
            attraction_name: attraction_name.into(),
            city: city.into(),
            state: state.into(),
            location,
        }
    }
}

/// One row of a nearest-attractions ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyAttraction {
    pub attraction_name: String,
    pub attraction_location: Location,
    /// The position the ranking was computed from
    pub user_location: Location,
    pub distance_miles: f64,
    pub reward_points: i32,
}
