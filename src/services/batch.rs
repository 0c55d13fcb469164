// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bounded fan-out of per-user work across a population.
//!
//! Each user's unit of work runs as its own tokio task. At most
//! `concurrency` tasks are in flight; the next one is spawned only when a
//! slot frees up. A batch ends when every unit has finished, when its time
//! budget runs out, or when its stop signal fires. Units still running at a
//! cut-off are aborted at their next await point and reported as failures.

use std::collections::HashSet;
use std::future::Future;
use std::pin::{pin, Pin};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use futures_util::{stream, StreamExt};
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use uuid::Uuid;

use crate::config::DEFAULT_BATCH_CONCURRENCY;
use crate::error::{Result, TourGuideError};
use crate::models::User;

/// A user whose unit of work did not complete.
#[derive(Debug)]
pub struct UserFailure {
    pub user_id: Uuid,
    pub error: TourGuideError,
}

/// Result of a batch run.
///
/// Every user in the batch appears exactly once, either in `completed` or
/// in `failures`.
///
/// A user reported with `BatchDeadlineExceeded` or `BatchCancelled` may
/// still have committed state: a unit can finish its writes after the
/// cut-off fires but before its result is collected.
#[derive(Debug)]
pub struct BatchOutcome<T> {
    /// Results of units that finished successfully, in completion order.
    pub completed: Vec<T>,
    /// Users whose unit failed or was cut off.
    pub failures: Vec<UserFailure>,
}

impl<T> Default for BatchOutcome<T> {
    fn default() -> Self {
        Self {
            completed: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl<T> BatchOutcome<T> {
    pub fn failed_user_ids(&self) -> Vec<Uuid> {
        self.failures.iter().map(|f| f.user_id).collect()
    }

    /// Returns true if every unit succeeded.
    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Returns true if every unit failed.
    pub fn is_complete_failure(&self) -> bool {
        self.completed.is_empty() && !self.failures.is_empty()
    }

    /// Returns true if some units succeeded and some failed.
    pub fn is_partial_failure(&self) -> bool {
        !self.completed.is_empty() && !self.failures.is_empty()
    }
}

/// Receiving half of a stop request for long-running work.
///
/// `StopSignal::never()` is used by callers that only want the time budget.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    rx: Option<watch::Receiver<bool>>,
}

impl StopSignal {
    pub fn never() -> Self {
        Self { rx: None }
    }

    pub fn from_receiver(rx: watch::Receiver<bool>) -> Self {
        Self { rx: Some(rx) }
    }

    pub fn is_stopped(&self) -> bool {
        self.rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Resolves once a stop has been requested. Pending forever otherwise,
    /// including when the sender is dropped without requesting a stop.
    pub async fn stopped(&mut self) {
        if let Some(rx) = self.rx.as_mut() {
            if rx.wait_for(|stop| *stop).await.is_ok() {
                return;
            }
        }
        std::future::pending::<()>().await;
    }
}

/// Why a batch ended before all units reported back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cutoff {
    Deadline,
    Stopped,
}

impl Cutoff {
    fn error(self) -> TourGuideError {
        match self {
            Cutoff::Deadline => TourGuideError::BatchDeadlineExceeded,
            Cutoff::Stopped => TourGuideError::BatchCancelled,
        }
    }
}

/// Runs per-user units with bounded parallelism.
#[derive(Debug, Clone, Copy)]
pub struct BatchScheduler {
    concurrency: usize,
    time_budget: Option<Duration>,
}

impl Default for BatchScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_CONCURRENCY)
    }
}

impl BatchScheduler {
    /// `concurrency` is clamped to at least one worker.
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
            time_budget: None,
        }
    }

    pub fn with_time_budget(self, budget: Duration) -> Self {
        Self {
            time_budget: Some(budget),
            ..self
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget
    }

    /// Run `unit` for every user and wait for all of them.
    ///
    /// A failing unit never affects its siblings. A panicking unit is
    /// reported as an internal error for that user.
    pub async fn run<T, F, Fut>(
        &self,
        operation: &'static str,
        users: Vec<Arc<User>>,
        stop: StopSignal,
        mut unit: F,
    ) -> BatchOutcome<T>
    where
        F: FnMut(Arc<User>) -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let started = Instant::now();
        let total = users.len();
        let user_ids: Vec<Uuid> = users.iter().map(|u| u.user_id).collect();

        tracing::info!(
            operation,
            users = total,
            concurrency = self.concurrency,
            "Starting batch"
        );

        let mut in_flight = stream::iter(users)
            .map(|user| {
                let user_id = user.user_id;
                let worker = Worker(tokio::spawn(unit(user)));
                async move { (user_id, worker.await) }
            })
            .buffer_unordered(self.concurrency);

        let mut cutoff = pin!(wait_for_cutoff(self.time_budget, stop));
        let mut outcome = BatchOutcome::default();
        let mut finished = HashSet::with_capacity(total);
        let mut interrupted = None;

        loop {
            tokio::select! {
                biased;

                next = in_flight.next() => {
                    let Some((user_id, joined)) = next else {
                        break;
                    };
                    finished.insert(user_id);
                    match joined {
                        Ok(Ok(value)) => outcome.completed.push(value),
                        Ok(Err(error)) => {
                            tracing::warn!(operation, %user_id, error = %error, "User unit failed");
                            outcome.failures.push(UserFailure { user_id, error });
                        }
                        Err(join_error) => {
                            tracing::error!(operation, %user_id, error = %join_error, "User unit panicked");
                            outcome.failures.push(UserFailure {
                                user_id,
                                error: TourGuideError::Internal(anyhow::anyhow!(
                                    "worker task failed: {}",
                                    join_error
                                )),
                            });
                        }
                    }
                }

                reason = &mut cutoff => {
                    interrupted = Some(reason);
                    break;
                }
            }
        }

        // Aborts whatever is still running.
        drop(in_flight);

        if let Some(reason) = interrupted {
            let abandoned = user_ids
                .into_iter()
                .filter(|id| !finished.contains(id))
                .map(|user_id| UserFailure {
                    user_id,
                    error: reason.error(),
                })
                .collect::<Vec<_>>();
            tracing::warn!(
                operation,
                reason = ?reason,
                abandoned = abandoned.len(),
                "Batch cut short"
            );
            outcome.failures.extend(abandoned);
        }

        tracing::info!(
            operation,
            users = total,
            completed = outcome.completed.len(),
            failed = outcome.failures.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Batch finished"
        );

        outcome
    }
}

async fn wait_for_cutoff(time_budget: Option<Duration>, mut stop: StopSignal) -> Cutoff {
    let deadline = async {
        match time_budget {
            Some(budget) => tokio::time::sleep(budget).await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        _ = deadline => Cutoff::Deadline,
        _ = stop.stopped() => Cutoff::Stopped,
    }
}

/// Join handle that aborts its task when dropped unfinished.
struct Worker<T>(JoinHandle<T>);

impl<T> Future for Worker<T> {
    type Output = std::result::Result<T, JoinError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().0).poll(cx)
    }
}

impl<T> Drop for Worker<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn make_users(count: usize) -> Vec<Arc<User>> {
        (0..count)
            .map(|i| {
                Arc::new(User::new(
                    Uuid::new_v4(),
                    format!("internalUser{}", i),
                    "000",
                    format!("internalUser{}@tourGuide.com", i),
                ))
            })
            .collect()
    }

    #[tokio::test]
    async fn test_all_units_complete() {
        let users = make_users(50);
        let scheduler = BatchScheduler::new(4);

        let outcome = scheduler
            .run("test", users.clone(), StopSignal::never(), |user| async move {
                Ok(user.user_id)
            })
            .await;

        assert!(outcome.is_complete_success());
        let mut completed = outcome.completed;
        let mut expected: Vec<_> = users.iter().map(|u| u.user_id).collect();
        completed.sort();
        expected.sort();
        assert_eq!(completed, expected);
    }

    #[tokio::test]
    async fn test_failure_does_not_abort_siblings() {
        let users = make_users(10);
        let failing = users[3].user_id;

        let outcome = BatchScheduler::new(2)
            .run("test", users, StopSignal::never(), move |user| async move {
                if user.user_id == failing {
                    Err(TourGuideError::Internal(anyhow::anyhow!("boom")))
                } else {
                    Ok(())
                }
            })
            .await;

        assert!(outcome.is_partial_failure());
        assert_eq!(outcome.completed.len(), 9);
        assert_eq!(outcome.failed_user_ids(), vec![failing]);
    }

    #[tokio::test]
    async fn test_panicking_unit_is_reported() {
        let users = make_users(3);
        let panicking = users[0].user_id;

        let outcome = BatchScheduler::new(3)
            .run("test", users, StopSignal::never(), move |user| async move {
                if user.user_id == panicking {
                    panic!("unit panicked");
                }
                Ok(())
            })
            .await;

        assert_eq!(outcome.completed.len(), 2);
        assert_eq!(outcome.failed_user_ids(), vec![panicking]);
        assert!(matches!(
            outcome.failures[0].error,
            TourGuideError::Internal(_)
        ));
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let users = make_users(40);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let outcome = BatchScheduler::new(3)
            .run("test", users, StopSignal::never(), |_user| {
                let running = running.clone();
                let peak = peak.clone();
                async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(2)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                    Ok(())
                }
            })
            .await;

        assert_eq!(outcome.completed.len(), 40);
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_time_budget_reports_unfinished_users() {
        let users = make_users(6);

        let outcome = BatchScheduler::new(2)
            .with_time_budget(Duration::from_millis(50))
            .run("test", users, StopSignal::never(), |_user| async move {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(())
            })
            .await;

        assert!(outcome.is_complete_failure());
        assert_eq!(outcome.failures.len(), 6);
        assert!(outcome
            .failures
            .iter()
            .all(|f| matches!(f.error, TourGuideError::BatchDeadlineExceeded)));
    }

    #[tokio::test]
    async fn test_stop_signal_cuts_batch_short() {
        let users = make_users(4);
        let (stop_tx, stop_rx) = watch::channel(false);
        stop_tx.send_replace(true);

        let outcome = BatchScheduler::new(1)
            .run(
                "test",
                users,
                StopSignal::from_receiver(stop_rx),
                |_user| async move {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(())
                },
            )
            .await;

        assert_eq!(outcome.failures.len(), 4);
        assert!(outcome.failures.iter().all(|f| f.error.is_batch_interruption()));
    }

    #[tokio::test]
    async fn test_empty_population() {
        let outcome: BatchOutcome<()> = BatchScheduler::new(4)
            .run("test", Vec::new(), StopSignal::never(), |_user| async move { Ok(()) })
            .await;

        assert!(outcome.is_complete_success());
        assert!(!outcome.is_complete_failure());
        assert!(outcome.completed.is_empty());
    }

    #[test]
    fn test_zero_concurrency_clamped() {
        assert_eq!(BatchScheduler::new(0).concurrency(), 1);
    }

    #[test]
    fn test_default_is_io_sized_without_budget() {
        let scheduler = BatchScheduler::default();

        assert_eq!(scheduler.concurrency(), DEFAULT_BATCH_CONCURRENCY);
        assert!(scheduler.time_budget().is_none());
    }
}
