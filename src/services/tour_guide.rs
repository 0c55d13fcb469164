// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User location tracking and nearby-attraction queries.

use std::sync::Arc;

use dashmap::DashMap;
use futures_util::future::try_join_all;

use crate::config::{DEFAULT_NEARBY_ATTRACTIONS_COUNT, DEFAULT_TRACK_BUDGET};
use crate::error::{Result, TourGuideError};
use crate::models::{NearbyAttraction, User, UserReward, VisitedLocation};
use crate::services::batch::{BatchOutcome, BatchScheduler, StopSignal};
use crate::services::ranking::rank_attractions;
use crate::services::rewards::RewardsService;
use crate::services::sources::{PositionSource, RewardPointSource};

/// In-memory user registry keyed by user name.
pub type UserRegistry = Arc<DashMap<String, Arc<User>>>;

/// Tracks users and computes their rewards.
///
/// Cheap to clone; clones share the registry and collaborators.
pub struct TourGuideService<P, R> {
    position_source: Arc<P>,
    rewards: RewardsService<R>,
    users: UserRegistry,
    scheduler: BatchScheduler,
    nearby_attractions_count: usize,
}

impl<P, R> Clone for TourGuideService<P, R> {
    fn clone(&self) -> Self {
        Self {
            position_source: self.position_source.clone(),
            rewards: self.rewards.clone(),
            users: self.users.clone(),
            scheduler: self.scheduler,
            nearby_attractions_count: self.nearby_attractions_count,
        }
    }
}

impl<P: PositionSource, R: RewardPointSource> TourGuideService<P, R> {
    pub fn new(position_source: Arc<P>, rewards: RewardsService<R>) -> Self {
        Self {
            position_source,
            rewards,
            users: Arc::new(DashMap::new()),
            scheduler: BatchScheduler::default().with_time_budget(DEFAULT_TRACK_BUDGET),
            nearby_attractions_count: DEFAULT_NEARBY_ATTRACTIONS_COUNT,
        }
    }

    pub fn with_scheduler(self, scheduler: BatchScheduler) -> Self {
        Self { scheduler, ..self }
    }

    pub fn with_nearby_attractions_count(self, count: usize) -> Self {
        Self {
            nearby_attractions_count: count,
            ..self
        }
    }

    pub fn scheduler(&self) -> BatchScheduler {
        self.scheduler
    }

    pub fn rewards_service(&self) -> &RewardsService<R> {
        &self.rewards
    }

    // ─── User Registry ──────────────────────────────────────────

    /// Register a user unless the name is already taken.
    ///
    /// Returns the registered user, which is the existing one on a clash.
    pub fn add_user(&self, user: User) -> Arc<User> {
        self.users
            .entry(user.user_name.clone())
            .or_insert_with(|| Arc::new(user))
            .clone()
    }

    pub fn get_user(&self, user_name: &str) -> Option<Arc<User>> {
        self.users.get(user_name).map(|entry| entry.value().clone())
    }

    pub fn get_all_users(&self) -> Vec<Arc<User>> {
        self.users.iter().map(|entry| entry.value().clone()).collect()
    }

    pub fn get_user_rewards(&self, user: &User) -> Vec<UserReward> {
        user.user_rewards()
    }

    // ─── Tracking ───────────────────────────────────────────────

    /// Last known location, or a fresh fix if the user has no history.
    pub async fn get_user_location(&self, user: &User) -> Result<VisitedLocation> {
        match user.last_visited_location() {
            Some(visited_location) => Ok(visited_location),
            None => self.track_user_location(user).await,
        }
    }

    /// Fetch the user's current position, record it, and update rewards.
    pub async fn track_user_location(&self, user: &User) -> Result<VisitedLocation> {
        let visited_location = self
            .position_source
            .current_position(user.user_id)
            .await
            .map_err(|source| TourGuideError::PositionFetch {
                user_id: user.user_id,
                source,
            })?;

        user.add_to_visited_locations(visited_location.clone());
        self.rewards.compute_rewards_for_user(user).await?;

        Ok(visited_location)
    }

    /// Track every user with bounded parallelism.
    pub async fn track_population(&self, users: Vec<Arc<User>>) -> BatchOutcome<VisitedLocation> {
        self.track_population_until(users, StopSignal::never()).await
    }

    /// As [`Self::track_population`], abandoning unfinished users once
    /// `stop` fires.
    pub async fn track_population_until(
        &self,
        users: Vec<Arc<User>>,
        stop: StopSignal,
    ) -> BatchOutcome<VisitedLocation> {
        self.scheduler
            .run("track_location", users, stop, |user| {
                let service = self.clone();
                async move { service.track_user_location(&user).await }
            })
            .await
    }

    // ─── Nearby Attractions ─────────────────────────────────────

    /// The `k` closest attractions to a visit, however far away they are,
    /// with the reward points each is worth to the visiting user.
    pub async fn nearest_attractions(
        &self,
        visited_location: &VisitedLocation,
        k: usize,
    ) -> Result<Vec<NearbyAttraction>> {
        let mut ranked = rank_attractions(self.rewards.attractions(), visited_location.location);
        ranked.truncate(k);

        try_join_all(ranked.into_iter().map(|(attraction, distance_miles)| async move {
            let reward_points = self
                .rewards
                .get_reward_points(attraction, visited_location.user_id)
                .await?;
            Ok::<_, TourGuideError>(NearbyAttraction {
                attraction_name: attraction.attraction_name.clone(),
                attraction_location: attraction.location,
                user_location: visited_location.location,
                distance_miles,
                reward_points,
            })
        }))
        .await
    }

    /// [`Self::nearest_attractions`] with the configured count.
    pub async fn get_nearby_attractions(
        &self,
        visited_location: &VisitedLocation,
    ) -> Result<Vec<NearbyAttraction>> {
        self.nearest_attractions(visited_location, self.nearby_attractions_count)
            .await
    }
}
