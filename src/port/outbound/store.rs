//! Store ports for statement persistence.
//!
//! [`StatementStore`] is the only persistence contract the analysis core
//! depends on. [`StatementCatalog`] carries the extra operations operator
//! tooling needs (loading fixtures, inspecting results) and is never used
//! by the batch run.

use std::future::Future;

use crate::domain::{
    FinancialStatement, Institution, InstitutionId, PeerAnalysis, ReportingPeriod, SizePoint,
};
use crate::error::Result;

/// Read/write operations required by the peer analysis run.
///
/// # Implementation Notes
///
/// - Implementations must be thread-safe (`Send + Sync`); workers call them
///   concurrently.
/// - Reads may run concurrently with writes. Writes from one run always
///   target distinct (institution, period) keys.
/// - `update_peer_analysis` must replace the stored analysis as a single
///   atomic update.
pub trait StatementStore: Send + Sync {
    /// Distinct ids of institutions that have at least one statement.
    fn institution_ids_with_statements(
        &self,
    ) -> impl Future<Output = Result<Vec<InstitutionId>>> + Send;

    /// Size metric at the institution's most recent period, if known.
    fn latest_size(&self, id: &InstitutionId) -> impl Future<Output = Result<Option<f64>>> + Send;

    /// Periods the institution has statements for, oldest first.
    fn periods_for_institution(
        &self,
        id: &InstitutionId,
    ) -> impl Future<Output = Result<Vec<ReportingPeriod>>> + Send;

    /// Size metric of every institution with an applicable size at `period`.
    fn population_sizes_at_period(
        &self,
        period: ReportingPeriod,
    ) -> impl Future<Output = Result<Vec<SizePoint>>> + Send;

    /// Every statement filed for `period`.
    fn statements_for_period(
        &self,
        period: ReportingPeriod,
    ) -> impl Future<Output = Result<Vec<FinancialStatement>>> + Send;

    /// Overwrite the peer analysis of one statement.
    fn update_peer_analysis(
        &self,
        id: &InstitutionId,
        period: ReportingPeriod,
        analysis: &PeerAnalysis,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Operator-side catalog operations.
pub trait StatementCatalog: Send + Sync {
    /// Insert or replace an institution.
    fn upsert_institution(&self, institution: &Institution) -> impl Future<Output = Result<()>> + Send;

    /// Insert or replace a statement document, including any analysis it carries.
    fn upsert_statement(
        &self,
        statement: &FinancialStatement,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Look up an institution by id.
    fn institution(
        &self,
        id: &InstitutionId,
    ) -> impl Future<Output = Result<Option<Institution>>> + Send;

    /// Stored analysis for one statement, `None` if it was never analysed.
    fn peer_analysis(
        &self,
        id: &InstitutionId,
        period: ReportingPeriod,
    ) -> impl Future<Output = Result<Option<PeerAnalysis>>> + Send;
}
