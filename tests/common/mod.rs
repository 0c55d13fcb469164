// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tour_guide::models::{Attraction, Location, User, VisitedLocation};
use tour_guide::services::{
    PositionSource, RewardPointSource, RewardsService, StaticCatalog, TourGuideService,
};
use uuid::Uuid;

/// Load the bundled attraction catalog.
#[allow(dead_code)]
pub fn load_catalog() -> StaticCatalog {
    StaticCatalog::load_from_file("data/attractions.geojson")
        .expect("Failed to load attractions - is data/ committed?")
}

/// Catalog of `count` attractions on a grid, far enough apart that a visit
/// at one never qualifies for another under the default buffer.
#[allow(dead_code)]
pub fn grid_catalog(count: usize) -> StaticCatalog {
    let attractions = (0..count)
        .map(|i| {
            let row = (i / 40) as f64;
            let col = (i % 40) as f64;
            Attraction::new(
                Uuid::new_v4(),
                format!("Attraction {}", i),
                "Grid City",
                "GC",
                Location::new(-80.0 + row * 4.0, -170.0 + col * 8.0),
            )
        })
        .collect();
    StaticCatalog::from_attractions(attractions).expect("grid names are unique")
}

#[allow(dead_code)]
pub fn make_user(name: &str) -> User {
    User::new(
        Uuid::new_v4(),
        name,
        "000",
        format!("{}@tourGuide.com", name),
    )
}

/// Position source that always reports the same location, optionally
/// failing for selected users.
#[derive(Default)]
pub struct FixedGps {
    pub location: Option<Location>,
    pub failing_users: HashSet<Uuid>,
    pub latency: Duration,
}

#[allow(dead_code)]
impl FixedGps {
    pub fn at(location: Location) -> Self {
        Self {
            location: Some(location),
            ..Self::default()
        }
    }

    pub fn failing_for(mut self, user_id: Uuid) -> Self {
        self.failing_users.insert(user_id);
        self
    }
}

impl PositionSource for FixedGps {
    async fn current_position(&self, user_id: Uuid) -> anyhow::Result<VisitedLocation> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.failing_users.contains(&user_id) {
            anyhow::bail!("GPS unavailable for {}", user_id);
        }
        let location = self.location.unwrap_or(Location::new(0.0, 0.0));
        Ok(VisitedLocation::now(user_id, location))
    }
}

/// Reward source with fixed per-attraction points that counts lookups.
#[derive(Default)]
pub struct CountingRewards {
    pub points: HashMap<Uuid, i32>,
    pub default_points: i32,
    pub failing_attractions: HashSet<Uuid>,
    pub failing_users: HashSet<Uuid>,
    pub latency: Duration,
    pub calls: AtomicUsize,
}

#[allow(dead_code)]
impl CountingRewards {
    pub fn constant(points: i32) -> Self {
        Self {
            default_points: points,
            ..Self::default()
        }
    }

    pub fn with_points(mut self, attraction_id: Uuid, points: i32) -> Self {
        self.points.insert(attraction_id, points);
        self
    }

    pub fn failing_attraction(mut self, attraction_id: Uuid) -> Self {
        self.failing_attractions.insert(attraction_id);
        self
    }

    pub fn failing_user(mut self, user_id: Uuid) -> Self {
        self.failing_users.insert(user_id);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RewardPointSource for CountingRewards {
    async fn attraction_reward_points(
        &self,
        attraction_id: Uuid,
        user_id: Uuid,
    ) -> anyhow::Result<i32> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.failing_attractions.contains(&attraction_id) || self.failing_users.contains(&user_id)
        {
            anyhow::bail!("rewards service unavailable");
        }
        Ok(self
            .points
            .get(&attraction_id)
            .copied()
            .unwrap_or(self.default_points))
    }
}

/// Tour guide service over the given collaborators and catalog.
#[allow(dead_code)]
pub fn create_service(
    gps: FixedGps,
    rewards: CountingRewards,
    catalog: &StaticCatalog,
) -> (TourGuideService<FixedGps, CountingRewards>, Arc<CountingRewards>) {
    let rewards = Arc::new(rewards);
    let rewards_service = RewardsService::new(rewards.clone(), catalog);
    (
        TourGuideService::new(Arc::new(gps), rewards_service),
        rewards,
    )
}
