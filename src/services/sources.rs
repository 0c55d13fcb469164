// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! External collaborators consumed by the engine.
//!
//! Implementations may be slow (a live GPS query, a remote rewards system);
//! the engine awaits them from worker tasks, so their futures must be `Send`.

use std::future::Future;

use uuid::Uuid;

use crate::models::{Attraction, VisitedLocation};

/// Supplies a user's current position.
pub trait PositionSource: Send + Sync + 'static {
    fn current_position(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = anyhow::Result<VisitedLocation>> + Send;
}

/// Supplies the reward value of an attraction for a user.
///
/// The engine never caches these values.
pub trait RewardPointSource: Send + Sync + 'static {
    fn attraction_reward_points(
        &self,
        attraction_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = anyhow::Result<i32>> + Send;
}

/// Supplies the static attraction catalog.
pub trait AttractionCatalog {
    /// Must return the same attractions, in the same order, on every call.
    fn list_attractions(&self) -> Vec<Attraction>;
}
