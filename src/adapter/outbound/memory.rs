//! In-memory statement store.
//!
//! Backs tests and dry experiments. Statements are keyed by
//! (institution, period); the peer analysis lives inside the statement the
//! same way it does in the persisted document.

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;

use crate::domain::{
    extract, FinancialStatement, Institution, InstitutionId, Metric, PeerAnalysis,
    ReportingPeriod, SizePoint,
};
use crate::error::{Error, Result};
use crate::port::{StatementCatalog, StatementStore};

type StatementKey = (InstitutionId, ReportingPeriod);

/// In-memory store for statements and institutions.
#[derive(Debug)]
pub struct MemoryStore {
    size_metric: Metric,
    institutions: RwLock<HashMap<InstitutionId, Institution>>,
    statements: RwLock<BTreeMap<StatementKey, FinancialStatement>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_size_metric(Metric::TotalAssets)
    }
}

impl MemoryStore {
    /// Create an empty store sized by total assets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that sizes institutions by `size_metric`.
    #[must_use]
    pub fn with_size_metric(size_metric: Metric) -> Self {
        Self {
            size_metric,
            institutions: RwLock::new(HashMap::new()),
            statements: RwLock::new(BTreeMap::new()),
        }
    }

    /// Insert or replace a statement.
    pub fn insert_statement(&self, statement: FinancialStatement) {
        let key = (statement.institution_id.clone(), statement.period);
        self.statements.write().insert(key, statement);
    }

    /// Insert or replace an institution.
    pub fn insert_institution(&self, institution: Institution) {
        self.institutions
            .write()
            .insert(institution.id.clone(), institution);
    }

    /// Stored statement for one (institution, period).
    #[must_use]
    pub fn statement(&self, id: &InstitutionId, period: ReportingPeriod) -> Option<FinancialStatement> {
        self.statements.read().get(&(id.clone(), period)).cloned()
    }

    /// Number of statements carrying a peer analysis.
    #[must_use]
    pub fn analysed_count(&self) -> usize {
        self.statements
            .read()
            .values()
            .filter(|s| s.peer_analysis.is_some())
            .count()
    }

    /// Copy of every stored analysis keyed by (institution, period).
    #[must_use]
    pub fn snapshot_analyses(&self) -> HashMap<StatementKey, PeerAnalysis> {
        self.statements
            .read()
            .iter()
            .filter_map(|(key, s)| s.peer_analysis.clone().map(|a| (key.clone(), a)))
            .collect()
    }

    fn size_of(&self, statement: &FinancialStatement) -> Option<f64> {
        extract(statement, self.size_metric)
    }
}

impl StatementStore for MemoryStore {
    async fn institution_ids_with_statements(&self) -> Result<Vec<InstitutionId>> {
        let statements = self.statements.read();
        let mut ids: Vec<InstitutionId> = statements.keys().map(|(id, _)| id.clone()).collect();
        ids.dedup();
        Ok(ids)
    }

    async fn latest_size(&self, id: &InstitutionId) -> Result<Option<f64>> {
        let statements = self.statements.read();
        Ok(statements
            .iter()
            .rev()
            .filter(|((owner, _), _)| owner == id)
            .find_map(|(_, s)| self.size_of(s)))
    }

    async fn periods_for_institution(&self, id: &InstitutionId) -> Result<Vec<ReportingPeriod>> {
        let statements = self.statements.read();
        Ok(statements
            .keys()
            .filter(|(owner, _)| owner == id)
            .map(|(_, period)| *period)
            .collect())
    }

    async fn population_sizes_at_period(&self, period: ReportingPeriod) -> Result<Vec<SizePoint>> {
        let statements = self.statements.read();
        Ok(statements
            .values()
            .filter(|s| s.period == period)
            .filter_map(|s| {
                self.size_of(s)
                    .map(|size| SizePoint::new(s.institution_id.clone(), size))
            })
            .collect())
    }

    async fn statements_for_period(&self, period: ReportingPeriod) -> Result<Vec<FinancialStatement>> {
        let statements = self.statements.read();
        Ok(statements
            .values()
            .filter(|s| s.period == period)
            .cloned()
            .collect())
    }

    async fn update_peer_analysis(
        &self,
        id: &InstitutionId,
        period: ReportingPeriod,
        analysis: &PeerAnalysis,
    ) -> Result<()> {
        let mut statements = self.statements.write();
        let statement = statements
            .get_mut(&(id.clone(), period))
            .ok_or_else(|| Error::StatementNotFound {
                institution: id.to_string(),
                period: period.to_string(),
            })?;
        statement.peer_analysis = Some(analysis.clone());
        Ok(())
    }
}

impl StatementCatalog for MemoryStore {
    async fn upsert_institution(&self, institution: &Institution) -> Result<()> {
        self.insert_institution(institution.clone());
        Ok(())
    }

    async fn upsert_statement(&self, statement: &FinancialStatement) -> Result<()> {
        self.insert_statement(statement.clone());
        Ok(())
    }

    async fn institution(&self, id: &InstitutionId) -> Result<Option<Institution>> {
        Ok(self.institutions.read().get(id).cloned())
    }

    async fn peer_analysis(
        &self,
        id: &InstitutionId,
        period: ReportingPeriod,
    ) -> Result<Option<PeerAnalysis>> {
        Ok(self
            .statements
            .read()
            .get(&(id.clone(), period))
            .and_then(|s| s.peer_analysis.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CohortSummary, PeerAverages};
    use crate::testkit::domain::{period, StatementBuilder};
    use chrono::Utc;

    fn store() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert_statement(
            StatementBuilder::new("a", period("2023-12-31"))
                .total_assets(100.0)
                .build(),
        );
        store.insert_statement(
            StatementBuilder::new("a", period("2024-03-31"))
                .total_assets(120.0)
                .build(),
        );
        store.insert_statement(StatementBuilder::new("b", period("2024-03-31")).roa(1.0).build());
        store
    }

    fn analysis() -> PeerAnalysis {
        PeerAnalysis {
            cohort: CohortSummary::default(),
            averages: PeerAverages::empty(&[Metric::Roa]),
            rankings: BTreeMap::new(),
            generated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn lists_distinct_institutions() {
        let ids = store().institution_ids_with_statements().await.unwrap();
        assert_eq!(ids, vec![InstitutionId::new("a"), InstitutionId::new("b")]);
    }

    #[tokio::test]
    async fn latest_size_reads_most_recent_period() {
        let store = store();
        assert_eq!(store.latest_size(&"a".into()).await.unwrap(), Some(120.0));
        assert_eq!(store.latest_size(&"b".into()).await.unwrap(), None);
        assert_eq!(store.latest_size(&"zz".into()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn latest_size_walks_back_past_unsized_periods() {
        let store = store();
        store.insert_statement(StatementBuilder::new("a", period("2024-06-30")).roa(0.9).build());

        assert_eq!(store.latest_size(&"a".into()).await.unwrap(), Some(120.0));
    }

    #[tokio::test]
    async fn periods_are_oldest_first() {
        let periods = store().periods_for_institution(&"a".into()).await.unwrap();
        assert_eq!(periods, vec![period("2023-12-31"), period("2024-03-31")]);
    }

    #[tokio::test]
    async fn population_sizes_skip_unsized_statements() {
        let sizes = store()
            .population_sizes_at_period(period("2024-03-31"))
            .await
            .unwrap();
        assert_eq!(sizes, vec![SizePoint::new("a", 120.0)]);
    }

    #[tokio::test]
    async fn alternate_size_metric_is_honoured() {
        let store = MemoryStore::with_size_metric(Metric::TotalDeposits);
        store.insert_statement(
            StatementBuilder::new("a", period("2024-03-31"))
                .total_assets(100.0)
                .total_deposits(80.0)
                .build(),
        );
        assert_eq!(store.latest_size(&"a".into()).await.unwrap(), Some(80.0));
    }

    #[tokio::test]
    async fn update_requires_existing_statement() {
        let store = store();
        let err = store
            .update_peer_analysis(&"zz".into(), period("2024-03-31"), &analysis())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::StatementNotFound { .. }));

        store
            .update_peer_analysis(&"b".into(), period("2024-03-31"), &analysis())
            .await
            .unwrap();
        assert_eq!(store.analysed_count(), 1);
        assert!(store
            .peer_analysis(&"b".into(), period("2024-03-31"))
            .await
            .unwrap()
            .is_some());
    }
}
