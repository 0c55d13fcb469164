// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Proximity thresholds for reward qualification and "nearby" checks.

use crate::config::{
    check_radius, ConfigError, DEFAULT_ATTRACTION_PROXIMITY_RANGE_MILES,
    DEFAULT_PROXIMITY_BUFFER_MILES,
};
use crate::models::{Attraction, Location, VisitedLocation};
use crate::services::distance::distance_miles;

/// The two proximity radii, in miles.
///
/// Immutable: a reward pass copies the settings once and uses that copy
/// throughout, so a threshold can never change mid-pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximitySettings {
    proximity_buffer_miles: f64,
    attraction_proximity_range_miles: f64,
}

impl Default for ProximitySettings {
    fn default() -> Self {
        Self {
            proximity_buffer_miles: DEFAULT_PROXIMITY_BUFFER_MILES,
            attraction_proximity_range_miles: DEFAULT_ATTRACTION_PROXIMITY_RANGE_MILES,
        }
    }
}

impl ProximitySettings {
    pub fn new(
        proximity_buffer_miles: f64,
        attraction_proximity_range_miles: f64,
    ) -> Result<Self, ConfigError> {
        check_radius("proximity_buffer_miles", proximity_buffer_miles)?;
        check_radius(
            "attraction_proximity_range_miles",
            attraction_proximity_range_miles,
        )?;
        Ok(Self {
            proximity_buffer_miles,
            attraction_proximity_range_miles,
        })
    }

    /// Same settings with a different reward-qualification radius.
    pub fn with_proximity_buffer(self, miles: f64) -> Result<Self, ConfigError> {
        Self::new(miles, self.attraction_proximity_range_miles)
    }

    /// Same settings with the reward radius reset to its default.
    pub fn with_default_proximity_buffer(self) -> Self {
        Self {
            proximity_buffer_miles: DEFAULT_PROXIMITY_BUFFER_MILES,
            ..self
        }
    }

    pub fn proximity_buffer_miles(&self) -> f64 {
        self.proximity_buffer_miles
    }

    pub fn attraction_proximity_range_miles(&self) -> f64 {
        self.attraction_proximity_range_miles
    }

    /// Coarse check: is `location` within the attraction's general range?
    pub fn is_within_attraction_proximity(&self, attraction: &Attraction, location: Location) -> bool {
        distance_miles(attraction.location, location) <= self.attraction_proximity_range_miles
    }

    /// Strict check: does this visit qualify for the attraction's reward?
    pub fn is_near_attraction(&self, visited_location: &VisitedLocation, attraction: &Attraction) -> bool {
        distance_miles(attraction.location, visited_location.location) <= self.proximity_buffer_miles
    }
}
