// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Tour Guide: attraction rewards and nearby-attraction rankings
//!
//! This crate tracks user positions, grants rewards for attractions users
//! have visited, and ranks the attractions closest to a user, processing
//! large user populations concurrently.

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use error::{Result, TourGuideError};
