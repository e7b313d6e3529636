//! SQLite statement store implementation.
//!
//! Statements are stored as JSON documents keyed by (institution, period).
//! Periods are ISO dates, so ordering on the text column is chronological.

use diesel::prelude::*;
use tracing::{info, warn};

use crate::adapter::outbound::sqlite::database::connection::{
    create_pool, enable_wal, is_memory_url, run_migrations, DbPool,
};
use crate::adapter::outbound::sqlite::database::model::{InstitutionRow, StatementRow};
use crate::adapter::outbound::sqlite::database::schema::{financial_statements, institutions};
use crate::domain::{
    extract, FinancialStatement, Institution, InstitutionId, Metric, PeerAnalysis,
    ReportingPeriod, SizePoint,
};
use crate::error::{Error, Result};
use crate::port::{StatementCatalog, StatementStore};

/// SQLite-backed statement store.
///
/// Implements both [`StatementStore`] for the batch run and
/// [`StatementCatalog`] for operator tooling.
pub struct SqliteStore {
    pool: DbPool,
    size_metric: Metric,
}

impl SqliteStore {
    /// Wrap an existing, migrated pool.
    #[must_use]
    pub fn new(pool: DbPool, size_metric: Metric) -> Self {
        Self { pool, size_metric }
    }

    /// Open the database at `database_url` and bring its schema up to date.
    ///
    /// # Errors
    /// Returns an error if the pool cannot be created or migrations fail.
    pub fn open(database_url: &str, size_metric: Metric) -> Result<Self> {
        let pool = create_pool(database_url)?;
        run_migrations(&pool)?;
        if !is_memory_url(database_url) {
            enable_wal(&pool)?;
        }
        info!(database = database_url, size_metric = %size_metric, "Statement store opened");
        Ok(Self::new(pool, size_metric))
    }

    /// Release every pooled connection.
    pub fn close(self) {
        let state = self.pool.state();
        drop(self.pool);
        info!(connections = state.connections, "Statement store closed");
    }

    #[must_use]
    pub fn size_metric(&self) -> Metric {
        self.size_metric
    }

    fn conn(
        &self,
    ) -> Result<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<SqliteConnection>>>
    {
        self.pool.get().map_err(|e| Error::Connection(e.to_string()))
    }

    fn to_row(statement: &FinancialStatement) -> Result<StatementRow> {
        let analysis = statement
            .peer_analysis
            .as_ref()
            .map(|a| serde_json::to_string(a).map_err(|e| Error::Parse(e.to_string())))
            .transpose()?;
        let mut document = statement.clone();
        document.peer_analysis = None;

        Ok(StatementRow {
            institution_id: statement.institution_id.to_string(),
            period: statement.period.to_string(),
            document: serde_json::to_string(&document).map_err(|e| Error::Parse(e.to_string()))?,
            peer_analysis: analysis,
        })
    }

    fn from_row(row: StatementRow) -> Result<FinancialStatement> {
        let mut statement = Self::decode_document(&row.institution_id, &row.period, &row.document)?;
        statement.peer_analysis = row
            .peer_analysis
            .as_deref()
            .map(Self::decode_analysis)
            .transpose()?;
        Ok(statement)
    }

    /// Decode a document, trusting the key columns over the JSON body.
    fn decode_document(institution_id: &str, period: &str, document: &str) -> Result<FinancialStatement> {
        let mut statement: FinancialStatement =
            serde_json::from_str(document).map_err(|e| Error::Parse(e.to_string()))?;
        statement.institution_id = InstitutionId::new(institution_id);
        statement.period = period.parse()?;
        Ok(statement)
    }

    fn decode_analysis(json: &str) -> Result<PeerAnalysis> {
        serde_json::from_str(json).map_err(|e| Error::Parse(e.to_string()))
    }
}

impl StatementStore for SqliteStore {
    async fn institution_ids_with_statements(&self) -> Result<Vec<InstitutionId>> {
        let mut conn = self.conn()?;

        let ids: Vec<String> = financial_statements::table
            .select(financial_statements::institution_id)
            .distinct()
            .order(financial_statements::institution_id.asc())
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(ids.into_iter().map(InstitutionId::from).collect())
    }

    async fn latest_size(&self, id: &InstitutionId) -> Result<Option<f64>> {
        let mut conn = self.conn()?;

        let rows: Vec<(String, String)> = financial_statements::table
            .filter(financial_statements::institution_id.eq(id.as_str()))
            .order(financial_statements::period.desc())
            .select((financial_statements::period, financial_statements::document))
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        for (period, document) in rows {
            let statement = Self::decode_document(id.as_str(), &period, &document)?;
            if let Some(size) = extract(&statement, self.size_metric) {
                return Ok(Some(size));
            }
        }
        Ok(None)
    }

    async fn periods_for_institution(&self, id: &InstitutionId) -> Result<Vec<ReportingPeriod>> {
        let mut conn = self.conn()?;

        let periods: Vec<String> = financial_statements::table
            .filter(financial_statements::institution_id.eq(id.as_str()))
            .order(financial_statements::period.asc())
            .select(financial_statements::period)
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        periods
            .iter()
            .map(|p| p.parse().map_err(Error::from))
            .collect()
    }

    async fn population_sizes_at_period(&self, period: ReportingPeriod) -> Result<Vec<SizePoint>> {
        let mut conn = self.conn()?;
        let key = period.to_string();

        let rows: Vec<(String, String)> = financial_statements::table
            .filter(financial_statements::period.eq(&key))
            .order(financial_statements::institution_id.asc())
            .select((financial_statements::institution_id, financial_statements::document))
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut sizes = Vec::with_capacity(rows.len());
        for (institution_id, document) in rows {
            match Self::decode_document(&institution_id, &key, &document) {
                Ok(statement) => {
                    if let Some(size) = extract(&statement, self.size_metric) {
                        sizes.push(SizePoint::new(institution_id, size));
                    }
                }
                Err(e) => {
                    warn!(institution = %institution_id, period = %period, error = %e, "Skipping unreadable statement");
                }
            }
        }
        Ok(sizes)
    }

    async fn statements_for_period(&self, period: ReportingPeriod) -> Result<Vec<FinancialStatement>> {
        let mut conn = self.conn()?;
        let key = period.to_string();

        let rows: Vec<(String, String)> = financial_statements::table
            .filter(financial_statements::period.eq(&key))
            .order(financial_statements::institution_id.asc())
            .select((financial_statements::institution_id, financial_statements::document))
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut statements = Vec::with_capacity(rows.len());
        for (institution_id, document) in rows {
            match Self::decode_document(&institution_id, &key, &document) {
                Ok(statement) => statements.push(statement),
                Err(e) => {
                    warn!(institution = %institution_id, period = %period, error = %e, "Skipping unreadable statement");
                }
            }
        }
        Ok(statements)
    }

    async fn update_peer_analysis(
        &self,
        id: &InstitutionId,
        period: ReportingPeriod,
        analysis: &PeerAnalysis,
    ) -> Result<()> {
        let json = serde_json::to_string(analysis).map_err(|e| Error::Parse(e.to_string()))?;
        let key = period.to_string();
        let mut conn = self.conn()?;

        let updated = diesel::update(financial_statements::table.find((id.as_str(), key.as_str())))
            .set(financial_statements::peer_analysis.eq(Some(json)))
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        if updated == 0 {
            return Err(Error::StatementNotFound {
                institution: id.to_string(),
                period: key,
            });
        }
        Ok(())
    }
}

impl StatementCatalog for SqliteStore {
    async fn upsert_institution(&self, institution: &Institution) -> Result<()> {
        let row = InstitutionRow {
            id: institution.id.to_string(),
            name: institution.name.clone(),
        };
        let mut conn = self.conn()?;

        diesel::replace_into(institutions::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }

    async fn upsert_statement(&self, statement: &FinancialStatement) -> Result<()> {
        let row = Self::to_row(statement)?;
        let mut conn = self.conn()?;

        diesel::replace_into(financial_statements::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }

    async fn institution(&self, id: &InstitutionId) -> Result<Option<Institution>> {
        let mut conn = self.conn()?;

        let row: Option<InstitutionRow> = institutions::table
            .find(id.as_str())
            .select(InstitutionRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(row.map(|r| Institution::new(r.id, r.name)))
    }

    async fn peer_analysis(
        &self,
        id: &InstitutionId,
        period: ReportingPeriod,
    ) -> Result<Option<PeerAnalysis>> {
        let key = period.to_string();
        let mut conn = self.conn()?;

        let stored: Option<Option<String>> = financial_statements::table
            .find((id.as_str(), key.as_str()))
            .select(financial_statements::peer_analysis)
            .first(&mut conn)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;

        stored
            .flatten()
            .as_deref()
            .map(Self::decode_analysis)
            .transpose()
    }
}

impl SqliteStore {
    /// Full stored statement, analysis included.
    ///
    /// # Errors
    /// Returns an error on database or decoding failure.
    pub fn statement(&self, id: &InstitutionId, period: ReportingPeriod) -> Result<Option<FinancialStatement>> {
        let key = period.to_string();
        let mut conn = self.conn()?;

        let row: Option<StatementRow> = financial_statements::table
            .find((id.as_str(), key.as_str()))
            .select(StatementRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;

        row.map(Self::from_row).transpose()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Utc;

    use super::*;
    use crate::domain::{CohortSummary, PeerAverages, Ranking};
    use crate::testkit::domain::{institution, period, StatementBuilder};

    fn store() -> SqliteStore {
        SqliteStore::open(":memory:", Metric::TotalAssets).unwrap()
    }

    async fn seeded() -> SqliteStore {
        let store = store();
        for (id, p, size) in [
            ("a", "2023-12-31", 100.0),
            ("a", "2024-03-31", 120.0),
            ("b", "2024-03-31", 300.0),
        ] {
            store
                .upsert_statement(
                    &StatementBuilder::new(id, period(p))
                        .total_assets(size)
                        .roa(1.0)
                        .build(),
                )
                .await
                .unwrap();
        }
        store
            .upsert_statement(&StatementBuilder::new("c", period("2024-03-31")).roa(0.2).build())
            .await
            .unwrap();
        store
    }

    fn analysis() -> PeerAnalysis {
        let mut rankings = BTreeMap::new();
        rankings.insert(Metric::Roa, Ranking::ranked(2, 3, 1.0));
        PeerAnalysis {
            cohort: CohortSummary::default(),
            averages: PeerAverages::empty(&[Metric::Roa]),
            rankings,
            generated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn enumerates_distinct_institutions_in_order() {
        let store = seeded().await;
        let ids = store.institution_ids_with_statements().await.unwrap();
        assert_eq!(ids, vec!["a".into(), "b".into(), "c".into()]);
    }

    #[tokio::test]
    async fn latest_size_uses_most_recent_period() {
        let store = seeded().await;
        assert_eq!(store.latest_size(&"a".into()).await.unwrap(), Some(120.0));
        assert_eq!(store.latest_size(&"c".into()).await.unwrap(), None);
        assert_eq!(store.latest_size(&"missing".into()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn periods_are_chronological() {
        let store = seeded().await;
        let periods = store.periods_for_institution(&"a".into()).await.unwrap();
        assert_eq!(periods, vec![period("2023-12-31"), period("2024-03-31")]);
    }

    #[tokio::test]
    async fn population_reads_cover_one_period() {
        let store = seeded().await;
        let p = period("2024-03-31");

        let sizes = store.population_sizes_at_period(p).await.unwrap();
        assert_eq!(sizes, vec![SizePoint::new("a", 120.0), SizePoint::new("b", 300.0)]);

        let statements = store.statements_for_period(p).await.unwrap();
        assert_eq!(statements.len(), 3);
        assert!(statements.iter().all(|s| s.period == p));
    }

    #[tokio::test]
    async fn analysis_update_replaces_previous_value() {
        let store = seeded().await;
        let p = period("2024-03-31");

        store.update_peer_analysis(&"b".into(), p, &analysis()).await.unwrap();
        let mut second = analysis();
        second.rankings.insert(Metric::Roa, Ranking::ranked(1, 3, 1.0));
        store.update_peer_analysis(&"b".into(), p, &second).await.unwrap();

        let stored = store.peer_analysis(&"b".into(), p).await.unwrap().unwrap();
        assert_eq!(stored.rankings[&Metric::Roa].rank, 1);

        let statement = store.statement(&"b".into(), p).unwrap().unwrap();
        assert_eq!(statement.peer_analysis, Some(stored));
    }

    #[tokio::test]
    async fn analysis_update_for_unknown_statement_fails() {
        let store = seeded().await;
        let err = store
            .update_peer_analysis(&"zz".into(), period("2024-03-31"), &analysis())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::StatementNotFound { .. }));
    }

    #[tokio::test]
    async fn unanalysed_statement_has_no_analysis() {
        let store = seeded().await;
        let stored = store.peer_analysis(&"a".into(), period("2023-12-31")).await.unwrap();
        assert!(stored.is_none());
        let missing = store.peer_analysis(&"zz".into(), period("2023-12-31")).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn institutions_round_trip() {
        let store = store();
        store.upsert_institution(&institution("a")).await.unwrap();
        let loaded = store.institution(&"a".into()).await.unwrap().unwrap();
        assert_eq!(loaded.name, "a Bank");
        assert!(store.institution(&"b".into()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn alternate_size_metric_reads_deposits() {
        let store = SqliteStore::open(":memory:", Metric::TotalDeposits).unwrap();
        store
            .upsert_statement(
                &StatementBuilder::new("a", period("2024-03-31"))
                    .total_assets(100.0)
                    .total_deposits(70.0)
                    .build(),
            )
            .await
            .unwrap();
        assert_eq!(store.latest_size(&"a".into()).await.unwrap(), Some(70.0));
    }
}
