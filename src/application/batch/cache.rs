//! Per-run period snapshots.
//!
//! Every institution filed at a period needs the same population: the
//! period's sizes, its statements and its ranking table. A snapshot is
//! fetched with one bulk read per store call and shared between workers.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::application::ranking::RankingTable;
use crate::domain::{FinancialStatement, InstitutionId, Metric, ReportingPeriod, SizePoint};
use crate::error::Result;
use crate::port::StatementStore;

/// Everything the analysis of one period reads from the store.
#[derive(Debug)]
pub struct PeriodSnapshot {
    pub period: ReportingPeriod,
    pub sizes: Vec<SizePoint>,
    statements: Vec<FinancialStatement>,
    index: HashMap<InstitutionId, usize>,
    size_index: HashMap<InstitutionId, f64>,
    pub ranking: RankingTable,
}

impl PeriodSnapshot {
    /// Build a snapshot from already fetched data.
    #[must_use]
    pub fn new(
        period: ReportingPeriod,
        sizes: Vec<SizePoint>,
        statements: Vec<FinancialStatement>,
        metrics: &[Metric],
    ) -> Self {
        let ranking = RankingTable::build(&statements, metrics);
        let mut index = HashMap::with_capacity(statements.len());
        for (i, statement) in statements.iter().enumerate() {
            index.entry(statement.institution_id.clone()).or_insert(i);
        }
        let mut size_index = HashMap::with_capacity(sizes.len());
        for point in &sizes {
            size_index.entry(point.institution_id.clone()).or_insert(point.size);
        }
        Self {
            period,
            sizes,
            statements,
            index,
            size_index,
            ranking,
        }
    }

    /// Fetch a period from the store.
    ///
    /// # Errors
    /// Propagates store read failures.
    pub async fn load<S: StatementStore>(
        store: &S,
        period: ReportingPeriod,
        metrics: &[Metric],
    ) -> Result<Self> {
        let sizes = store.population_sizes_at_period(period).await?;
        let statements = store.statements_for_period(period).await?;
        debug!(
            period = %period,
            population = statements.len(),
            sized = sizes.len(),
            "Period snapshot loaded"
        );
        Ok(Self::new(period, sizes, statements, metrics))
    }

    #[must_use]
    pub fn statement(&self, id: &InstitutionId) -> Option<&FinancialStatement> {
        self.index.get(id).map(|&i| &self.statements[i])
    }

    /// The size a given institution reported at this period.
    #[must_use]
    pub fn size_of(&self, id: &InstitutionId) -> Option<f64> {
        self.size_index.get(id).copied()
    }

    #[must_use]
    pub fn population(&self) -> usize {
        self.statements.len()
    }
}

/// Memoizes period snapshots for the duration of one run.
///
/// Concurrent misses for the same period may both hit the store; the first
/// inserted snapshot wins and later callers reuse it. Entries are never
/// evicted, so a full run holds every period it touched.
#[derive(Debug)]
pub struct PeriodCache {
    enabled: bool,
    metrics: Vec<Metric>,
    entries: DashMap<ReportingPeriod, Arc<PeriodSnapshot>>,
}

impl PeriodCache {
    #[must_use]
    pub fn new(enabled: bool, metrics: Vec<Metric>) -> Self {
        Self {
            enabled,
            metrics,
            entries: DashMap::new(),
        }
    }

    /// Snapshot for `period`, loading it on a miss.
    ///
    /// # Errors
    /// Propagates store read failures. Failed loads are not cached.
    pub async fn snapshot<S: StatementStore>(
        &self,
        store: &S,
        period: ReportingPeriod,
    ) -> Result<Arc<PeriodSnapshot>> {
        if self.enabled {
            if let Some(hit) = self.entries.get(&period) {
                return Ok(Arc::clone(hit.value()));
            }
        }

        let snapshot = Arc::new(PeriodSnapshot::load(store, period, &self.metrics).await?);
        if !self.enabled {
            return Ok(snapshot);
        }

        let entry = self.entries.entry(period).or_insert(snapshot);
        Ok(Arc::clone(entry.value()))
    }

    /// Number of cached periods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
