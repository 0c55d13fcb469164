// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types.

use uuid::Uuid;

use crate::config::ConfigError;
use crate::services::catalog::CatalogError;

/// Errors surfaced by the tracking and reward engine.
#[derive(Debug, thiserror::Error)]
pub enum TourGuideError {
    #[error("Failed to fetch position for user {user_id}: {source}")]
    PositionFetch {
        user_id: Uuid,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to look up reward points for {attraction} (user {user_id}): {source}")]
    RewardLookup {
        user_id: Uuid,
        attraction: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Attraction catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Batch time budget exceeded before this user was processed")]
    BatchDeadlineExceeded,

    #[error("Batch stopped before this user was processed")]
    BatchCancelled,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl TourGuideError {
    /// True for failures caused by the batch being cut short rather than by
    /// the user's own unit of work.
    pub fn is_batch_interruption(&self) -> bool {
        matches!(
            self,
            TourGuideError::BatchDeadlineExceeded | TourGuideError::BatchCancelled
        )
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, TourGuideError>;
