// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Background tracker that periodically tracks every registered user.

use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::{Result, TourGuideError};
use crate::services::batch::StopSignal;
use crate::services::sources::{PositionSource, RewardPointSource};
use crate::services::tour_guide::TourGuideService;

/// Handle to the background tracking loop.
///
/// Dropping the handle requests a stop; use [`Tracker::shutdown`] to also
/// wait for the loop to exit.
pub struct Tracker {
    stop_tx: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl Tracker {
    /// Spawn the loop. Each iteration tracks all registered users, then
    /// sleeps for `interval`.
    pub fn start<P, R>(service: TourGuideService<P, R>, interval: Duration) -> Self
    where
        P: PositionSource,
        R: RewardPointSource,
    {
        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(run_loop(
            service,
            interval,
            StopSignal::from_receiver(stop_rx),
        ));

        tracing::info!(interval_secs = interval.as_secs(), "Tracker started");
        Self {
            stop_tx,
            handle: Some(handle),
        }
    }

    /// Request the loop to stop. Safe to call more than once.
    pub fn stop_tracking(&self) {
        let already_stopped = self.stop_tx.send_replace(true);
        if !already_stopped {
            tracing::info!("Tracker stopping");
        }
    }

    pub fn is_stopped(&self) -> bool {
        *self.stop_tx.borrow()
    }

    /// Stop the loop and wait for it to exit.
    pub async fn shutdown(mut self) -> Result<()> {
        self.stop_tracking();
        match self.handle.take() {
            Some(handle) => handle.await.map_err(|e| {
                TourGuideError::Internal(anyhow::anyhow!("tracker task failed: {}", e))
            }),
            None => Ok(()),
        }
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        self.stop_tracking();
    }
}

async fn run_loop<P, R>(service: TourGuideService<P, R>, interval: Duration, mut stop: StopSignal)
where
    P: PositionSource,
    R: RewardPointSource,
{
    while !stop.is_stopped() {
        let users = service.get_all_users();
        tracing::debug!(users = users.len(), "Begin tracker pass");

        let started = Instant::now();
        let outcome = service.track_population_until(users, stop.clone()).await;
        tracing::info!(
            tracked = outcome.completed.len(),
            failed = outcome.failures.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Tracker pass finished"
        );

        tokio::select! {
            _ = stop.stopped() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    tracing::info!("Tracker stopped");
}
