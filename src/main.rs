// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tour Guide tracker
//!
//! Loads the attraction catalog, registers simulated internal users and
//! runs the background tracker until Ctrl-C.

use std::sync::Arc;

use tour_guide::{
    config::Config,
    services::{
        generate_internal_users, BatchScheduler, ProximitySettings, RewardsService,
        SimulatedGps, SimulatedRewardCentral, StaticCatalog, TourGuideService, Tracker,
    },
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        proximity_buffer_miles = config.proximity_buffer_miles,
        batch_concurrency = config.batch_concurrency,
        "Starting Tour Guide tracker"
    );

    // Load attractions
    tracing::info!(path = %config.attractions_path.display(), "Loading attractions");
    let catalog = StaticCatalog::load_from_file(&config.attractions_path)?;

    let settings = ProximitySettings::new(
        config.proximity_buffer_miles,
        config.attraction_proximity_range_miles,
    )?;
    let rewards_service = RewardsService::new(Arc::new(SimulatedRewardCentral::default()), &catalog)
        .with_settings(settings)
        .with_scheduler(
            BatchScheduler::new(config.batch_concurrency).with_time_budget(config.rewards_budget),
        );

    let service = TourGuideService::new(Arc::new(SimulatedGps::default()), rewards_service)
        .with_scheduler(
            BatchScheduler::new(config.batch_concurrency).with_time_budget(config.track_budget),
        )
        .with_nearby_attractions_count(config.nearby_attractions_count);

    // Register internal users
    for user in generate_internal_users(config.internal_user_count) {
        service.add_user(user);
    }
    tracing::info!(users = config.internal_user_count, "Internal users initialized");

    // Show what is around the first user before tracking begins
    if let Some(user) = service.get_user("internalUser0") {
        let visited_location = service.get_user_location(&user).await?;
        let nearby = service.get_nearby_attractions(&visited_location).await?;
        tracing::info!(
            user = %user.user_name,
            nearby = %serde_json::to_string(&nearby)?,
            "Nearby attractions"
        );
    }

    let tracker = Tracker::start(service.clone(), config.tracking_interval);

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");
    tracker.shutdown().await?;

    let outcome = service
        .rewards_service()
        .compute_rewards_for_population(service.get_all_users())
        .await;
    tracing::info!(
        users = outcome.completed.len() + outcome.failures.len(),
        failed = outcome.failures.len(),
        total_points = service
            .get_all_users()
            .iter()
            .map(|u| u.total_reward_points())
            .sum::<i64>(),
        "Final reward pass complete"
    );

    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tour_guide=debug,info")),
        )
        .with(format)
        .init();
}
