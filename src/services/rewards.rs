// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reward computation service.
//!
//! Handles the core workflow for one user:
//! 1. Snapshot the visit history and the attractions already rewarded
//! 2. Pair every visit with every attraction and keep the first qualifying
//!    visit per unrewarded attraction
//! 3. Look up the points for each candidate concurrently
//! 4. Append each reward with an atomic check-and-insert on the user

use std::collections::HashSet;
use std::sync::Arc;

use futures_util::future::join_all;
use uuid::Uuid;

use crate::config::{ConfigError, DEFAULT_REWARDS_BUDGET};
use crate::error::{Result, TourGuideError};
use crate::models::{Attraction, Location, User, UserReward, VisitedLocation};
use crate::services::batch::{BatchOutcome, BatchScheduler, StopSignal};
use crate::services::proximity::ProximitySettings;
use crate::services::sources::{AttractionCatalog, RewardPointSource};

/// Rewards earned by one user during a pass.
#[derive(Debug, Clone)]
pub struct RewardPass {
    pub user_id: Uuid,
    /// Rewards this pass added (empty if nothing new qualified)
    pub added: Vec<UserReward>,
}

/// Computes attraction rewards for users.
pub struct RewardsService<R> {
    reward_source: Arc<R>,
    attractions: Arc<[Attraction]>,
    settings: ProximitySettings,
    scheduler: BatchScheduler,
}

impl<R> Clone for RewardsService<R> {
    fn clone(&self) -> Self {
        Self {
            reward_source: self.reward_source.clone(),
            attractions: self.attractions.clone(),
            settings: self.settings,
            scheduler: self.scheduler,
        }
    }
}

impl<R: RewardPointSource> RewardsService<R> {
    /// The catalog is read once here and shared read-only from then on.
    /// Population passes default to the rewards time budget.
    pub fn new(reward_source: Arc<R>, catalog: &impl AttractionCatalog) -> Self {
        Self {
            reward_source,
            attractions: catalog.list_attractions().into(),
            settings: ProximitySettings::default(),
            scheduler: BatchScheduler::default().with_time_budget(DEFAULT_REWARDS_BUDGET),
        }
    }

    pub fn with_settings(self, settings: ProximitySettings) -> Self {
        Self { settings, ..self }
    }

    pub fn with_scheduler(self, scheduler: BatchScheduler) -> Self {
        Self { scheduler, ..self }
    }

    /// A service that qualifies visits within `miles` of an attraction.
    ///
    /// Passes already running on `self` keep their own threshold.
    pub fn with_proximity_buffer(&self, miles: f64) -> std::result::Result<Self, ConfigError> {
        let settings = self.settings.with_proximity_buffer(miles)?;
        Ok(self.clone().with_settings(settings))
    }

    pub fn with_default_proximity_buffer(&self) -> Self {
        let settings = self.settings.with_default_proximity_buffer();
        self.clone().with_settings(settings)
    }

    pub fn settings(&self) -> ProximitySettings {
        self.settings
    }

    pub fn attractions(&self) -> &[Attraction] {
        &self.attractions
    }

    pub fn scheduler(&self) -> BatchScheduler {
        self.scheduler
    }

    pub fn is_within_attraction_proximity(&self, attraction: &Attraction, location: Location) -> bool {
        self.settings
            .is_within_attraction_proximity(attraction, location)
    }

    /// Fetch the points an attraction is worth to a user. Never cached.
    pub async fn get_reward_points(&self, attraction: &Attraction, user_id: Uuid) -> Result<i32> {
        self.reward_source
            .attraction_reward_points(attraction.attraction_id, user_id)
            .await
            .map_err(|source| TourGuideError::RewardLookup {
                user_id,
                attraction: attraction.attraction_name.clone(),
                source,
            })
    }

    /// Grant every reward the user's visit history qualifies for.
    ///
    /// Returns the rewards added by this call. If a point lookup fails, the
    /// other candidates still complete and keep their rewards, and the first
    /// lookup error is returned.
    pub async fn compute_rewards_for_user(&self, user: &User) -> Result<Vec<UserReward>> {
        let settings = self.settings;
        let visited_locations = user.visited_locations();
        let already_rewarded: HashSet<String> =
            user.rewarded_attraction_names().into_iter().collect();

        let candidates = qualifying_visits(
            &settings,
            &visited_locations,
            &self.attractions,
            &already_rewarded,
        );

        if candidates.is_empty() {
            tracing::debug!(user_id = %user.user_id, "No new rewards");
            return Ok(Vec::new());
        }

        let results = join_all(candidates.into_iter().map(|(visited_location, attraction)| async move {
            let points = self.get_reward_points(attraction, user.user_id).await?;
            let reward = UserReward::new(visited_location.clone(), attraction.clone(), points);
            // A concurrent pass may have rewarded the same attraction meanwhile.
            Ok::<_, TourGuideError>(user.add_user_reward(reward.clone()).then_some(reward))
        }))
        .await;

        let mut added = Vec::new();
        let mut first_error = None;
        for result in results {
            match result {
                Ok(Some(reward)) => added.push(reward),
                Ok(None) => {}
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        tracing::debug!(
            user_id = %user.user_id,
            added = added.len(),
            attractions = ?added.iter().map(UserReward::attraction_name).collect::<Vec<_>>(),
            "Rewards computed"
        );

        match first_error {
            Some(e) => Err(e),
            None => Ok(added),
        }
    }

    /// Compute rewards for every user with bounded parallelism.
    pub async fn compute_rewards_for_population(&self, users: Vec<Arc<User>>) -> BatchOutcome<RewardPass> {
        self.compute_rewards_for_population_until(users, StopSignal::never())
            .await
    }

    /// As [`Self::compute_rewards_for_population`], abandoning unfinished
    /// users once `stop` fires.
    pub async fn compute_rewards_for_population_until(
        &self,
        users: Vec<Arc<User>>,
        stop: StopSignal,
    ) -> BatchOutcome<RewardPass> {
        self.scheduler
            .run("compute_rewards", users, stop, |user| {
                let service = self.clone();
                async move {
                    let added = service.compute_rewards_for_user(&user).await?;
                    Ok(RewardPass {
                        user_id: user.user_id,
                        added,
                    })
                }
            })
            .await
    }
}

/// First qualifying visit per attraction not yet rewarded, in history order.
fn qualifying_visits<'a>(
    settings: &ProximitySettings,
    visited_locations: &'a [VisitedLocation],
    attractions: &'a [Attraction],
    already_rewarded: &HashSet<String>,
) -> Vec<(&'a VisitedLocation, &'a Attraction)> {
    let mut claimed: HashSet<&str> = HashSet::new();
    let mut candidates = Vec::new();

    for visited_location in visited_locations {
        for attraction in attractions {
            let name = attraction.attraction_name.as_str();
            if already_rewarded.contains(name) || claimed.contains(name) {
                continue;
            }
            if settings.is_near_attraction(visited_location, attraction) {
                claimed.insert(name);
                candidates.push((visited_location, attraction));
            }
        }
    }

    candidates
}
