// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Distance ranking of the attraction catalog.

use crate::models::{Attraction, Location};
use crate::services::distance::distance_miles;

/// Every attraction paired with its distance from `location`, nearest first.
///
/// The sort is stable, so equidistant attractions keep catalog order.
pub fn rank_attractions(attractions: &[Attraction], location: Location) -> Vec<(&Attraction, f64)> {
    let mut ranked: Vec<(&Attraction, f64)> = attractions
        .iter()
        .map(|a| (a, distance_miles(a.location, location)))
        .collect();
    ranked.sort_by(|(_, a), (_, b)| a.total_cmp(b));
    ranked
}
