//! Participant sync scheduler
//!
//! Runs `fetch -> augment -> write` on a repeating schedule:
//!
//! ```text
//! Idle -> Fetching -> Augmenting -> Writing -> Idle -> ...
//!   \________________________________________/
//!              cancellation -> Stopped
//! ```
//!
//! The first cycle starts immediately. After each cycle the scheduler waits
//! for the next tick or for cancellation, whichever comes first. Cycles run
//! inside the single scheduler task, so two cycles never write at once.
//! Stage errors end the cycle without writing; only cancellation ends the
//! scheduler.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sponsor_common::config::CollectionRef;
use sponsor_common::time::elapsed_ms;
use sqlx::SqlitePool;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::augmenter::ResumeAugmenter;
use super::fetcher::{SourceFetcher, FETCH_TIMEOUT};
use super::scheme::{redact_address, validate_scheme};
use super::source::DocumentStore;
use super::{ExternalRecord, SyncError};
use crate::db::replace_participants;

/// Source of "start the next cycle" signals.
///
/// Production uses [`IntervalTicker`]; tests inject a ticker they control.
#[async_trait]
pub trait Ticker: Send + Sync + 'static {
    /// Resolve when the next cycle should start
    async fn tick(&mut self);
}

/// Fires one full period after each call, measured from the end of the
/// previous cycle
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) {
        self.interval.reset();
        self.interval.tick().await;
    }
}

/// Scheduler state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    Idle,
    Fetching,
    Augmenting,
    Writing,
    Stopped,
}

/// How a cycle ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CycleOutcome {
    Completed {
        participants: usize,
        with_resume: usize,
    },
    Failed {
        stage: SyncState,
        error: String,
    },
    Cancelled {
        stage: SyncState,
    },
}

/// Summary of one finished cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub cycle: u64,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub outcome: CycleOutcome,
}

/// Snapshot published after every state change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncStatus {
    pub state: SyncState,
    pub cycles_run: u64,
    pub last_success_at: Option<DateTime<Utc>>,
    pub last_cycle: Option<CycleReport>,
}

impl Default for SyncStatus {
    fn default() -> Self {
        Self {
            state: SyncState::Idle,
            cycles_run: 0,
            last_success_at: None,
            last_cycle: None,
        }
    }
}

/// Addresses and collections for one scheduler
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Registration store address
    pub quill_db_uri: String,
    /// Resume store address
    pub resumes_db_uri: String,
    pub quill_users: CollectionRef,
    pub resumes: CollectionRef,
    /// Deadline for the registration fetch and the resume store connect
    pub fetch_timeout: Duration,
}

impl SyncSettings {
    pub fn new(
        quill_db_uri: impl Into<String>,
        resumes_db_uri: impl Into<String>,
        quill_users: CollectionRef,
        resumes: CollectionRef,
    ) -> Self {
        Self {
            quill_db_uri: quill_db_uri.into(),
            resumes_db_uri: resumes_db_uri.into(),
            quill_users,
            resumes,
            fetch_timeout: FETCH_TIMEOUT,
        }
    }
}

/// Handle to a running scheduler
pub struct SyncHandle {
    status: watch::Receiver<SyncStatus>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl SyncHandle {
    /// Receiver for status updates
    pub fn status(&self) -> watch::Receiver<SyncStatus> {
        self.status.clone()
    }

    /// Signal the scheduler to stop after the current stage
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the scheduler task to finish
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            error!(error = %e, "Participant sync task panicked");
        }
    }

    /// Cancel and wait for the scheduler task to finish
    pub async fn shutdown(self) {
        self.cancel();
        self.join().await;
    }
}

/// Periodic participant synchronization
pub struct SyncScheduler<T: Ticker> {
    settings: SyncSettings,
    fetcher: SourceFetcher,
    augmenter: ResumeAugmenter,
    db: SqlitePool,
    ticker: T,
}

impl<T: Ticker> SyncScheduler<T> {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        db: SqlitePool,
        settings: SyncSettings,
        ticker: T,
    ) -> Self {
        let fetcher = SourceFetcher::new(
            Arc::clone(&store),
            settings.quill_db_uri.clone(),
            settings.quill_users.clone(),
        )
        .with_timeout(settings.fetch_timeout);
        let augmenter = ResumeAugmenter::new(
            store,
            settings.resumes_db_uri.clone(),
            settings.resumes.clone(),
        )
        .with_connect_timeout(settings.fetch_timeout);

        Self {
            settings,
            fetcher,
            augmenter,
            db,
            ticker,
        }
    }

    /// Validate both source addresses and start syncing in the background.
    ///
    /// Returns as soon as the task is spawned. Address errors are returned
    /// here and nothing is spawned; every later failure is only logged.
    pub fn start(self, cancel: CancellationToken) -> Result<SyncHandle, SyncError> {
        validate_scheme(&self.settings.quill_db_uri)?;
        validate_scheme(&self.settings.resumes_db_uri)?;

        info!(
            quill = %redact_address(&self.settings.quill_db_uri),
            resumes = %redact_address(&self.settings.resumes_db_uri),
            "Starting participant sync"
        );

        let (status_tx, status_rx) = watch::channel(SyncStatus::default());
        let task = tokio::spawn(self.run(cancel.clone(), status_tx));

        Ok(SyncHandle {
            status: status_rx,
            cancel,
            task,
        })
    }

    async fn run(mut self, cancel: CancellationToken, status: watch::Sender<SyncStatus>) {
        let mut cycle = 0u64;

        while !cancel.is_cancelled() {
            cycle += 1;
            let report = self.run_cycle(cycle, &cancel, &status).await;
            let succeeded = matches!(report.outcome, CycleOutcome::Completed { .. });

            status.send_modify(|s| {
                s.state = SyncState::Idle;
                s.cycles_run = cycle;
                if succeeded {
                    s.last_success_at = Some(report.started_at);
                }
                s.last_cycle = Some(report);
            });

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = self.ticker.tick() => {}
            }
        }

        status.send_modify(|s| s.state = SyncState::Stopped);
        info!(cycles = cycle, "Participant sync stopped");
    }

    async fn run_cycle(
        &self,
        cycle: u64,
        cancel: &CancellationToken,
        status: &watch::Sender<SyncStatus>,
    ) -> CycleReport {
        let start = Instant::now();
        let started_at = sponsor_common::time::now();
        debug!(cycle, "Sync cycle starting");

        let mut stage = SyncState::Fetching;
        let result = self.sync_once(cancel, |next| {
            stage = next;
            status.send_modify(|s| s.state = next);
        })
        .await;

        let outcome = match result {
            Ok(records) => {
                let with_resume = records.iter().filter(|r| r.has_resume()).count();
                info!(
                    cycle,
                    participants = records.len(),
                    with_resume,
                    elapsed_ms = elapsed_ms(start),
                    "Sync cycle completed"
                );
                CycleOutcome::Completed {
                    participants: records.len(),
                    with_resume,
                }
            }
            Err(SyncError::Cancelled) => {
                warn!(cycle, stage = ?stage, "Sync cycle cancelled; nothing written");
                CycleOutcome::Cancelled { stage }
            }
            Err(e) => {
                error!(
                    cycle,
                    stage = ?stage,
                    error = %e,
                    elapsed_ms = elapsed_ms(start),
                    "Sync cycle failed; participant table left unchanged"
                );
                CycleOutcome::Failed {
                    stage,
                    error: e.to_string(),
                }
            }
        };

        CycleReport {
            cycle,
            started_at,
            elapsed_ms: elapsed_ms(start),
            outcome,
        }
    }

    /// One fetch -> augment -> write pass. `enter` is called on each stage
    /// transition. Cancellation is honored between stages and during
    /// augmentation, never after the write has begun.
    async fn sync_once(
        &self,
        cancel: &CancellationToken,
        mut enter: impl FnMut(SyncState),
    ) -> Result<Vec<ExternalRecord>, SyncError> {
        enter(SyncState::Fetching);
        let records = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SyncError::Cancelled),
            fetched = self.fetcher.fetch() => fetched?,
        };

        enter(SyncState::Augmenting);
        let records = self.augmenter.augment(records, cancel).await?;

        if cancel.is_cancelled() {
            return Err(SyncError::Cancelled);
        }

        enter(SyncState::Writing);
        replace_participants(&self.db, &records).await?;
        Ok(records)
    }
}
