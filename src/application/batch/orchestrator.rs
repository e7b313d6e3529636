//! Batch orchestration of the peer analysis run.
//!
//! # Architecture
//!
//! ```text
//! ids ──order by latest size──► queue ──► worker 1 ─┐
//!                                  │ ──► worker 2 ─┼─► outcomes ──► RunSummary
//!                                  │ ──► worker N ─┘
//!                                  ▼
//!                        PeriodCache ◄──► StatementStore
//! ```
//!
//! A fixed number of workers pull institutions from a shared queue, so a
//! slow institution only occupies its own worker. Each worker walks one
//! institution's periods oldest first and writes every period's analysis
//! before moving on. A failure ends that institution only.

use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use futures_util::stream::{self, StreamExt};
use futures_util::FutureExt;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::analyze::analyze_period;
use super::cache::PeriodCache;
use super::summary::{InstitutionOutcome, InstitutionState, RunSummary};
use crate::domain::{DomainError, InstitutionId, Metric, ReportingPeriod};
use crate::error::{Error, Result};
use crate::port::StatementStore;

/// What to do with an institution that has no reporting periods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyInstitutionPolicy {
    /// Count it as skipped; it does not affect the error count.
    #[default]
    Skip,
    /// Count it as an error.
    Error,
}

/// Parameters of one run.
#[derive(Debug, Clone)]
pub struct BatchSettings {
    /// Peers per side (N).
    pub peer_count: usize,
    /// Metrics averaged and ranked.
    pub metrics: Vec<Metric>,
    /// Concurrent workers.
    pub workers: usize,
    pub empty_institutions: EmptyInstitutionPolicy,
    /// Share period snapshots between institutions.
    pub cache_periods: bool,
    /// Compute without writing results.
    pub dry_run: bool,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            peer_count: 10,
            metrics: Metric::ALL.to_vec(),
            workers: 10,
            empty_institutions: EmptyInstitutionPolicy::Skip,
            cache_periods: true,
            dry_run: false,
        }
    }
}

/// State shared by every worker of one run.
struct RunContext<S> {
    store: Arc<S>,
    settings: BatchSettings,
    peer_count: usize,
    cache: PeriodCache,
    queue: Mutex<VecDeque<InstitutionId>>,
    shutdown: watch::Receiver<bool>,
    generated_at: DateTime<Utc>,
}

impl<S> RunContext<S> {
    fn next(&self) -> Option<InstitutionId> {
        if *self.shutdown.borrow() {
            return None;
        }
        self.queue.lock().pop_front()
    }
}

/// Drives the analysis over the institution population.
pub struct BatchOrchestrator<S> {
    store: Arc<S>,
    settings: BatchSettings,
    shutdown: watch::Receiver<bool>,
}

impl<S: StatementStore + 'static> BatchOrchestrator<S> {
    /// Create an orchestrator that runs until the population is exhausted.
    pub fn new(store: Arc<S>, settings: BatchSettings) -> Self {
        let (_shutdown_tx, shutdown) = watch::channel(false);
        Self {
            store,
            settings,
            shutdown,
        }
    }

    /// Stop scheduling institutions once `shutdown` flips to `true`.
    ///
    /// Institutions already in progress finish their current work.
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = shutdown;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &BatchSettings {
        &self.settings
    }

    /// Run over every institution that has statements.
    ///
    /// # Errors
    /// Fails only if the population cannot be enumerated or the settings
    /// are invalid.
    pub async fn run(&self) -> Result<RunSummary> {
        let ids = self.store.institution_ids_with_statements().await?;
        self.run_all(ids, self.settings.peer_count).await
    }

    /// Run over the given institutions with `peer_count` peers per side.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidPeerCount`] for a zero peer count. Per
    /// institution failures are reported in the summary, never here.
    pub async fn run_all(&self, ids: Vec<InstitutionId>, peer_count: usize) -> Result<RunSummary> {
        if peer_count == 0 {
            return Err(DomainError::InvalidPeerCount { count: peer_count }.into());
        }

        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let mut ids = ids;
        ids.sort();
        ids.dedup();

        let ordered = self.order_by_size(ids).await;
        let total = ordered.len();
        let mut summary = RunSummary::new(run_id, started_at, total, self.settings.dry_run);

        info!(
            run_id = %run_id,
            institutions = total,
            peer_count,
            metrics = self.settings.metrics.len(),
            workers = self.settings.workers,
            dry_run = self.settings.dry_run,
            "Peer analysis run started"
        );

        let context = Arc::new(RunContext {
            store: Arc::clone(&self.store),
            settings: self.settings.clone(),
            peer_count,
            cache: PeriodCache::new(self.settings.cache_periods, self.settings.metrics.clone()),
            queue: Mutex::new(ordered.into_iter().collect()),
            shutdown: self.shutdown.clone(),
            generated_at: started_at,
        });

        let workers = self.settings.workers.max(1).min(total.max(1));
        let handles: Vec<_> = (0..workers)
            .map(|worker_id| {
                let context = Arc::clone(&context);
                tokio::spawn(async move { worker_loop(worker_id, context).await })
            })
            .collect();

        for joined in join_all(handles).await {
            match joined {
                Ok(outcomes) => outcomes.into_iter().for_each(|o| summary.record(o)),
                Err(e) => {
                    error!(error = %e, "Worker task aborted");
                    return Err(Error::Worker(e.to_string()));
                }
            }
        }

        let unscheduled: Vec<InstitutionId> = context.queue.lock().drain(..).collect();
        let cancelled = !unscheduled.is_empty();
        for institution in unscheduled {
            summary.record(InstitutionOutcome {
                institution,
                state: InstitutionState::Pending,
                periods_written: 0,
                failed_period: None,
                error: None,
            });
        }
        summary.finish(Utc::now(), cancelled);

        if cancelled {
            warn!(
                run_id = %run_id,
                processed = summary.processed,
                errors = summary.errors,
                cancelled = summary.cancelled,
                "Peer analysis run cancelled"
            );
        } else {
            info!(
                run_id = %run_id,
                processed = summary.processed,
                errors = summary.errors,
                skipped = summary.skipped,
                periods = summary.periods_written,
                cached_periods = context.cache.len(),
                "Peer analysis run finished"
            );
        }

        Ok(summary)
    }

    /// Largest first by latest known size, unknown sizes last, ties by id.
    async fn order_by_size(&self, ids: Vec<InstitutionId>) -> Vec<InstitutionId> {
        let store = &self.store;
        let mut sized: Vec<(InstitutionId, Option<f64>)> = stream::iter(ids)
            .map(|id| async move {
                let size = match store.latest_size(&id).await {
                    Ok(size) => size.filter(|s| s.is_finite()),
                    Err(e) => {
                        warn!(institution = %id, error = %e, "Latest size unavailable, ordering last");
                        None
                    }
                };
                (id, size)
            })
            .buffered(self.settings.workers.max(1))
            .collect()
            .await;

        sized.sort_by(|(a_id, a), (b_id, b)| match (a, b) {
            (Some(a), Some(b)) => b.total_cmp(a).then_with(|| a_id.cmp(b_id)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a_id.cmp(b_id),
        });
        sized.into_iter().map(|(id, _)| id).collect()
    }
}

async fn worker_loop<S: StatementStore>(
    worker_id: usize,
    context: Arc<RunContext<S>>,
) -> Vec<InstitutionOutcome> {
    debug!(worker_id, "Worker started");
    let mut outcomes = Vec::new();

    while let Some(institution) = context.next() {
        let outcome = match AssertUnwindSafe(process_institution(&context, institution.clone()))
            .catch_unwind()
            .await
        {
            Ok(outcome) => outcome,
            Err(_) => {
                error!(worker_id, institution = %institution, "Institution processing panicked");
                InstitutionOutcome::failed(institution, 0, None, "processing panicked")
            }
        };
        outcomes.push(outcome);
    }

    debug!(worker_id, handled = outcomes.len(), "Worker finished");
    outcomes
}

async fn process_institution<S: StatementStore>(
    context: &RunContext<S>,
    institution: InstitutionId,
) -> InstitutionOutcome {
    let mut periods = match context.store.periods_for_institution(&institution).await {
        Ok(periods) => periods,
        Err(e) => {
            error!(institution = %institution, error = %e, "Failed to list reporting periods");
            return InstitutionOutcome::failed(institution, 0, None, e.to_string());
        }
    };

    if periods.is_empty() {
        return match context.settings.empty_institutions {
            EmptyInstitutionPolicy::Skip => {
                debug!(institution = %institution, "No reporting periods, skipped");
                InstitutionOutcome::skipped(institution)
            }
            EmptyInstitutionPolicy::Error => {
                warn!(institution = %institution, "No reporting periods");
                InstitutionOutcome::failed(institution, 0, None, "no reporting periods")
            }
        };
    }

    periods.sort();
    periods.dedup();

    let mut written = 0;
    for period in periods {
        if let Err(e) = process_period(context, &institution, period).await {
            error!(
                institution = %institution,
                period = %period,
                error = %e,
                "Institution processing failed"
            );
            return InstitutionOutcome::failed(institution, written, Some(period), e.to_string());
        }
        written += 1;
    }

    debug!(institution = %institution, periods = written, "Institution completed");
    InstitutionOutcome::completed(institution, written)
}

async fn process_period<S: StatementStore>(
    context: &RunContext<S>,
    institution: &InstitutionId,
    period: ReportingPeriod,
) -> Result<()> {
    let snapshot = context.cache.snapshot(context.store.as_ref(), period).await?;
    let analysis = analyze_period(
        &snapshot,
        institution,
        context.peer_count,
        &context.settings.metrics,
        context.generated_at,
    );

    if context.settings.dry_run {
        return Ok(());
    }
    context
        .store
        .update_peer_analysis(institution, period, &analysis)
        .await
}
