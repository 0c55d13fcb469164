// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Attraction catalog loading.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use geo::Point;
use geojson::{Feature, GeoJson};
use uuid::Uuid;

use crate::models::{Attraction, Location};
use crate::services::sources::AttractionCatalog;

/// Immutable in-memory catalog, cheap to clone and share.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    attractions: Arc<[Attraction]>,
}

impl StaticCatalog {
    /// Build a catalog from attractions already in memory.
    pub fn from_attractions(attractions: Vec<Attraction>) -> Result<Self, CatalogError> {
        check_unique_names(&attractions)?;
        Ok(Self {
            attractions: attractions.into(),
        })
    }

    /// Load attractions from a GeoJSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let json_data =
            fs::read_to_string(path.as_ref()).map_err(|e| CatalogError::IoError(e.to_string()))?;
        Self::load_from_json(&json_data)
    }

    /// Load attractions from a GeoJSON string.
    ///
    /// Expects a `FeatureCollection` of `Point` features carrying `id`,
    /// `name`, `city` and `state` properties.
    pub fn load_from_json(json_data: &str) -> Result<Self, CatalogError> {
        let geojson: GeoJson = json_data
            .parse()
            .map_err(|e: geojson::Error| CatalogError::ParseError(e.to_string()))?;

        let GeoJson::FeatureCollection(collection) = geojson else {
            return Err(CatalogError::ParseError(
                "expected a FeatureCollection".to_string(),
            ));
        };

        let attractions = collection
            .features
            .into_iter()
            .map(Self::convert_feature)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(count = attractions.len(), "Loaded attractions");
        Self::from_attractions(attractions)
    }

    fn convert_feature(feature: Feature) -> Result<Attraction, CatalogError> {
        let text = |key: &'static str| -> Result<String, CatalogError> {
            feature
                .property(key)
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .ok_or(CatalogError::MissingProperty(key))
        };

        let name = text("name")?;
        let attraction_id = Uuid::parse_str(&text("id")?)
            .map_err(|e| CatalogError::ParseError(format!("{}: invalid id: {}", name, e)))?;
        let city = text("city").unwrap_or_default();
        let state = text("state").unwrap_or_default();

        let geometry = feature
            .geometry
            .as_ref()
            .ok_or(CatalogError::UnsupportedGeometry)?;
        let point: Point<f64> = geometry
            .value
            .clone()
            .try_into()
            .map_err(|_: geojson::Error| CatalogError::UnsupportedGeometry)?;

        Ok(Attraction::new(
            attraction_id,
            name,
            city,
            state,
            Location::from(point),
        ))
    }

    /// Get the list of attractions.
    pub fn attractions(&self) -> &[Attraction] {
        &self.attractions
    }
}

impl AttractionCatalog for StaticCatalog {
    fn list_attractions(&self) -> Vec<Attraction> {
        self.attractions.to_vec()
    }
}

fn check_unique_names(attractions: &[Attraction]) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for attraction in attractions {
        if !seen.insert(attraction.attraction_name.as_str()) {
            return Err(CatalogError::DuplicateName(
                attraction.attraction_name.clone(),
            ));
        }
    }
    Ok(())
}

/// Errors from catalog loading.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read file: {0}")]
    IoError(String),

    #[error("Failed to parse GeoJSON: {0}")]
    ParseError(String),

    #[error("Unsupported geometry type (expected Point)")]
    UnsupportedGeometry,

    #[error("Missing feature property: {0}")]
    MissingProperty(&'static str),

    #[error("Duplicate attraction name: {0}")]
    DuplicateName(String),
}
