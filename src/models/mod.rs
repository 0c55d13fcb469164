// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod attraction;
pub mod location;
pub mod reward;
pub mod user;

pub use attraction::{Attraction, NearbyAttraction};
pub use location::{Location, VisitedLocation};
pub use reward::UserReward;
pub use user::User;
