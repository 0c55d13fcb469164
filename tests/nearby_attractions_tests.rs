// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Nearest-attraction ranking.

use tour_guide::models::{Location, VisitedLocation};
use tour_guide::services::distance_miles;
use tour_guide::TourGuideError;

mod common;
use common::{create_service, grid_catalog, load_catalog, make_user, CountingRewards, FixedGps};

#[tokio::test]
async fn test_small_catalog_returns_everything() {
    let catalog = grid_catalog(3);
    let (service, _) = create_service(FixedGps::default(), CountingRewards::constant(1), &catalog);
    let user = make_user("jon");
    let visit = VisitedLocation::now(user.user_id, Location::new(0.0, 0.0));

    let nearby = service.nearest_attractions(&visit, 5).await.unwrap();

    assert_eq!(nearby.len(), 3);
    assert!(nearby
        .windows(2)
        .all(|w| w[0].distance_miles <= w[1].distance_miles));
}

#[tokio::test]
async fn test_returns_k_closest_sorted() {
    let catalog = grid_catalog(10);
    let (service, source) =
        create_service(FixedGps::default(), CountingRewards::constant(1), &catalog);
    let user = make_user("jon");
    // Next to "Attraction 7"
    let query = Location::new(-80.0, -170.0 + 7.0 * 8.0 + 0.5);
    let visit = VisitedLocation::now(user.user_id, query);

    let nearby = service.nearest_attractions(&visit, 5).await.unwrap();

    assert_eq!(nearby.len(), 5);
    assert!(nearby
        .windows(2)
        .all(|w| w[0].distance_miles <= w[1].distance_miles));
    assert_eq!(nearby[0].attraction_name, "Attraction 7");
    // Only the returned attractions are looked up
    assert_eq!(source.calls(), 5);

    // Nothing outside the top five is closer than the fifth
    let fifth = nearby[4].distance_miles;
    let returned: Vec<&str> = nearby.iter().map(|n| n.attraction_name.as_str()).collect();
    for attraction in catalog.attractions() {
        if !returned.contains(&attraction.attraction_name.as_str()) {
            assert!(distance_miles(attraction.location, query) >= fifth);
        }
    }
}

#[tokio::test]
async fn test_result_fields() {
    let catalog = load_catalog();
    let disneyland = catalog
        .attractions()
        .iter()
        .find(|a| a.attraction_name == "Disneyland")
        .unwrap()
        .clone();
    let (service, _) = create_service(
        FixedGps::default(),
        CountingRewards::constant(1).with_points(disneyland.attraction_id, 321),
        &catalog,
    );
    let user = make_user("jon");
    let visit = VisitedLocation::now(user.user_id, disneyland.location);

    let nearby = service.get_nearby_attractions(&visit).await.unwrap();

    assert_eq!(nearby.len(), 5);
    let first = &nearby[0];
    assert_eq!(first.attraction_name, "Disneyland");
    assert_eq!(first.attraction_location, disneyland.location);
    assert_eq!(first.user_location, disneyland.location);
    assert_eq!(first.distance_miles, 0.0);
    assert_eq!(first.reward_points, 321);
    assert_eq!(nearby[1].attraction_name, "San Diego Zoo");
}

#[tokio::test]
async fn test_zero_k_is_empty() {
    let catalog = load_catalog();
    let (service, source) =
        create_service(FixedGps::default(), CountingRewards::constant(1), &catalog);
    let visit = VisitedLocation::now(make_user("jon").user_id, Location::new(0.0, 0.0));

    assert!(service.nearest_attractions(&visit, 0).await.unwrap().is_empty());
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn test_reward_lookup_failure_propagates() {
    let catalog = load_catalog();
    let user = make_user("jon");
    let (service, _) = create_service(
        FixedGps::default(),
        CountingRewards::constant(1).failing_user(user.user_id),
        &catalog,
    );
    let visit = VisitedLocation::now(user.user_id, Location::new(0.0, 0.0));

    let result = service.nearest_attractions(&visit, 5).await;

    assert!(matches!(result, Err(TourGuideError::RewardLookup { .. })));
}

#[tokio::test]
async fn test_ranking_is_deterministic() {
    let catalog = load_catalog();
    let (service, _) = create_service(FixedGps::default(), CountingRewards::constant(1), &catalog);
    let visit = VisitedLocation::now(make_user("jon").user_id, Location::new(39.0, -95.0));

    let first = service.nearest_attractions(&visit, 5).await.unwrap();
    let second = service.nearest_attractions(&visit, 5).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(catalog.attractions().len(), 26);
}
