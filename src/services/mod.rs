// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod batch;
pub mod catalog;
pub mod distance;
pub mod proximity;
pub mod ranking;
pub mod rewards;
pub mod simulation;
pub mod sources;
pub mod tour_guide;
pub mod tracker;

pub use batch::{BatchOutcome, BatchScheduler, StopSignal, UserFailure};
pub use catalog::{CatalogError, StaticCatalog};
pub use distance::distance_miles;
pub use proximity::ProximitySettings;
pub use ranking::rank_attractions;
pub use rewards::{RewardPass, RewardsService};
pub use simulation::{generate_internal_users, SimulatedGps, SimulatedRewardCentral};
pub use sources::{AttractionCatalog, PositionSource, RewardPointSource};
pub use tour_guide::TourGuideService;
pub use tracker::Tracker;
