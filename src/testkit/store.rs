//! Store wrappers that observe or sabotage a real store.
//!
//! Each wrapper forwards to an inner [`StatementStore`] and adds one
//! behaviour on top of it.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::domain::{FinancialStatement, InstitutionId, PeerAnalysis, ReportingPeriod, SizePoint};
use crate::error::{Error, Result};
use crate::port::StatementStore;

/// Counts bulk period reads.
#[derive(Debug)]
pub struct CountingStore<S> {
    inner: S,
    period_reads: AtomicUsize,
}

impl<S> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            period_reads: AtomicUsize::new(0),
        }
    }

    /// Number of `statements_for_period` calls so far.
    pub fn period_reads(&self) -> usize {
        self.period_reads.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: StatementStore> StatementStore for CountingStore<S> {
    async fn institution_ids_with_statements(&self) -> Result<Vec<InstitutionId>> {
        self.inner.institution_ids_with_statements().await
    }

    async fn latest_size(&self, id: &InstitutionId) -> Result<Option<f64>> {
        self.inner.latest_size(id).await
    }

    async fn periods_for_institution(&self, id: &InstitutionId) -> Result<Vec<ReportingPeriod>> {
        self.inner.periods_for_institution(id).await
    }

    async fn population_sizes_at_period(&self, period: ReportingPeriod) -> Result<Vec<SizePoint>> {
        self.inner.population_sizes_at_period(period).await
    }

    async fn statements_for_period(&self, period: ReportingPeriod) -> Result<Vec<FinancialStatement>> {
        self.period_reads.fetch_add(1, Ordering::SeqCst);
        self.inner.statements_for_period(period).await
    }

    async fn update_peer_analysis(
        &self,
        id: &InstitutionId,
        period: ReportingPeriod,
        analysis: &PeerAnalysis,
    ) -> Result<()> {
        self.inner.update_peer_analysis(id, period, analysis).await
    }
}

/// Injects failures for chosen operations.
#[derive(Debug)]
pub struct FailingStore<S> {
    inner: S,
    fail_enumeration: bool,
    fail_updates: HashSet<InstitutionId>,
    fail_periods: HashSet<InstitutionId>,
    fail_sizes: HashSet<InstitutionId>,
}

impl<S> FailingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            fail_enumeration: false,
            fail_updates: HashSet::new(),
            fail_periods: HashSet::new(),
            fail_sizes: HashSet::new(),
        }
    }

    /// Fail `institution_ids_with_statements`.
    pub fn fail_enumeration(mut self) -> Self {
        self.fail_enumeration = true;
        self
    }

    /// Fail every analysis write for `id`.
    pub fn fail_updates_for(mut self, id: &str) -> Self {
        self.fail_updates.insert(id.into());
        self
    }

    /// Fail the period listing for `id`.
    pub fn fail_periods_for(mut self, id: &str) -> Self {
        self.fail_periods.insert(id.into());
        self
    }

    /// Fail the latest size lookup for `id`.
    pub fn fail_sizes_for(mut self, id: &str) -> Self {
        self.fail_sizes.insert(id.into());
        self
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

fn injected(operation: &str, id: &InstitutionId) -> Error {
    Error::Database(format!("injected {operation} failure for {id}"))
}

impl<S: StatementStore> StatementStore for FailingStore<S> {
    async fn institution_ids_with_statements(&self) -> Result<Vec<InstitutionId>> {
        if self.fail_enumeration {
            return Err(Error::Connection("injected enumeration failure".into()));
        }
        self.inner.institution_ids_with_statements().await
    }

    async fn latest_size(&self, id: &InstitutionId) -> Result<Option<f64>> {
        if self.fail_sizes.contains(id) {
            return Err(injected("size", id));
        }
        self.inner.latest_size(id).await
    }

    async fn periods_for_institution(&self, id: &InstitutionId) -> Result<Vec<ReportingPeriod>> {
        if self.fail_periods.contains(id) {
            return Err(injected("period", id));
        }
        self.inner.periods_for_institution(id).await
    }

    async fn population_sizes_at_period(&self, period: ReportingPeriod) -> Result<Vec<SizePoint>> {
        self.inner.population_sizes_at_period(period).await
    }

    async fn statements_for_period(&self, period: ReportingPeriod) -> Result<Vec<FinancialStatement>> {
        self.inner.statements_for_period(period).await
    }

    async fn update_peer_analysis(
        &self,
        id: &InstitutionId,
        period: ReportingPeriod,
        analysis: &PeerAnalysis,
    ) -> Result<()> {
        if self.fail_updates.contains(id) {
            return Err(injected("update", id));
        }
        self.inner.update_peer_analysis(id, period, analysis).await
    }
}

/// Records the order of analysis writes.
#[derive(Debug)]
pub struct RecordingStore<S> {
    inner: S,
    writes: Mutex<Vec<(InstitutionId, ReportingPeriod)>>,
}

impl<S> RecordingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            writes: Mutex::new(Vec::new()),
        }
    }

    /// Every write so far, in order.
    pub fn writes(&self) -> Vec<(InstitutionId, ReportingPeriod)> {
        self.writes.lock().clone()
    }

    /// Institutions in the order they were first written.
    pub fn first_write_order(&self) -> Vec<InstitutionId> {
        let mut seen = HashSet::new();
        self.writes
            .lock()
            .iter()
            .filter(|(id, _)| seen.insert(id.clone()))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Periods written for one institution, in write order.
    pub fn periods_written_for(&self, id: &InstitutionId) -> Vec<ReportingPeriod> {
        self.writes
            .lock()
            .iter()
            .filter(|(owner, _)| owner == id)
            .map(|(_, period)| *period)
            .collect()
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: StatementStore> StatementStore for RecordingStore<S> {
    async fn institution_ids_with_statements(&self) -> Result<Vec<InstitutionId>> {
        self.inner.institution_ids_with_statements().await
    }

    async fn latest_size(&self, id: &InstitutionId) -> Result<Option<f64>> {
        self.inner.latest_size(id).await
    }

    async fn periods_for_institution(&self, id: &InstitutionId) -> Result<Vec<ReportingPeriod>> {
        self.inner.periods_for_institution(id).await
    }

    async fn population_sizes_at_period(&self, period: ReportingPeriod) -> Result<Vec<SizePoint>> {
        self.inner.population_sizes_at_period(period).await
    }

    async fn statements_for_period(&self, period: ReportingPeriod) -> Result<Vec<FinancialStatement>> {
        self.inner.statements_for_period(period).await
    }

    async fn update_peer_analysis(
        &self,
        id: &InstitutionId,
        period: ReportingPeriod,
        analysis: &PeerAnalysis,
    ) -> Result<()> {
        self.inner.update_peer_analysis(id, period, analysis).await?;
        self.writes.lock().push((id.clone(), period));
        Ok(())
    }
}

/// Slows analysis writes and flips a shutdown channel after a number of them.
#[derive(Debug)]
pub struct InterruptingStore<S> {
    inner: S,
    shutdown: watch::Sender<bool>,
    after_writes: usize,
    write_delay: Duration,
    writes: AtomicUsize,
}

impl<S> InterruptingStore<S> {
    /// Send `true` on `shutdown` once `after_writes` writes have landed.
    pub fn new(inner: S, shutdown: watch::Sender<bool>, after_writes: usize) -> Self {
        Self {
            inner,
            shutdown,
            after_writes,
            write_delay: Duration::from_millis(5),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: StatementStore> StatementStore for InterruptingStore<S> {
    async fn institution_ids_with_statements(&self) -> Result<Vec<InstitutionId>> {
        self.inner.institution_ids_with_statements().await
    }

    async fn latest_size(&self, id: &InstitutionId) -> Result<Option<f64>> {
        self.inner.latest_size(id).await
    }

    async fn periods_for_institution(&self, id: &InstitutionId) -> Result<Vec<ReportingPeriod>> {
        self.inner.periods_for_institution(id).await
    }

    async fn population_sizes_at_period(&self, period: ReportingPeriod) -> Result<Vec<SizePoint>> {
        self.inner.population_sizes_at_period(period).await
    }

    async fn statements_for_period(&self, period: ReportingPeriod) -> Result<Vec<FinancialStatement>> {
        self.inner.statements_for_period(period).await
    }

    async fn update_peer_analysis(
        &self,
        id: &InstitutionId,
        period: ReportingPeriod,
        analysis: &PeerAnalysis,
    ) -> Result<()> {
        tokio::time::sleep(self.write_delay).await;
        self.inner.update_peer_analysis(id, period, analysis).await?;
        if self.writes.fetch_add(1, Ordering::SeqCst) + 1 == self.after_writes {
            self.shutdown.send_replace(true);
        }
        Ok(())
    }
}

/// Tracks how many institutions are being processed at once.
///
/// An institution enters when its periods are listed and leaves with the
/// write for its newest period.
#[derive(Debug)]
pub struct InFlightStore<S> {
    inner: S,
    newest: Mutex<HashMap<InstitutionId, ReportingPeriod>>,
    live: AtomicUsize,
    peak: AtomicUsize,
}

impl<S> InFlightStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            newest: Mutex::new(HashMap::new()),
            live: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Highest number of institutions in flight at once.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Institutions currently in flight.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: StatementStore> StatementStore for InFlightStore<S> {
    async fn institution_ids_with_statements(&self) -> Result<Vec<InstitutionId>> {
        self.inner.institution_ids_with_statements().await
    }

    async fn latest_size(&self, id: &InstitutionId) -> Result<Option<f64>> {
        self.inner.latest_size(id).await
    }

    async fn periods_for_institution(&self, id: &InstitutionId) -> Result<Vec<ReportingPeriod>> {
        let periods = self.inner.periods_for_institution(id).await?;
        if let Some(newest) = periods.iter().max() {
            self.newest.lock().insert(id.clone(), *newest);
            let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(live, Ordering::SeqCst);
        }
        Ok(periods)
    }

    async fn population_sizes_at_period(&self, period: ReportingPeriod) -> Result<Vec<SizePoint>> {
        self.inner.population_sizes_at_period(period).await
    }

    async fn statements_for_period(&self, period: ReportingPeriod) -> Result<Vec<FinancialStatement>> {
        self.inner.statements_for_period(period).await
    }

    async fn update_peer_analysis(
        &self,
        id: &InstitutionId,
        period: ReportingPeriod,
        analysis: &PeerAnalysis,
    ) -> Result<()> {
        tokio::task::yield_now().await;
        self.inner.update_peer_analysis(id, period, analysis).await?;
        let finished = self.newest.lock().get(id) == Some(&period);
        if finished {
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }
}
