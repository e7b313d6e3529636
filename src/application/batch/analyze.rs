//! Peer analysis of one institution at one period.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::cache::PeriodSnapshot;
use crate::application::peer::{average, select_peers};
use crate::domain::{
    CohortSummary, FinancialStatement, InstitutionId, Metric, PeerAnalysis, PeerCohort,
};

/// Select the cohort, average it and rank the target against the period.
///
/// An institution without an applicable size at the period gets an empty
/// cohort; its population rankings are still computed.
#[must_use]
pub fn analyze_period(
    snapshot: &PeriodSnapshot,
    target: &InstitutionId,
    peer_count: usize,
    metrics: &[Metric],
    generated_at: DateTime<Utc>,
) -> PeerAnalysis {
    let cohort = match snapshot.size_of(target) {
        Some(size) => select_peers(&snapshot.sizes, target, size, peer_count),
        None => {
            debug!(institution = %target, period = %snapshot.period, "No size reported, cohort left empty");
            PeerCohort::default()
        }
    };

    if cohort.is_empty() {
        debug!(institution = %target, period = %snapshot.period, "Empty peer cohort");
    }

    let members: Vec<&FinancialStatement> = cohort
        .members()
        .filter_map(|id| snapshot.statement(id))
        .collect();

    let mut rankings = snapshot.ranking.rankings_for(target);
    rankings.retain(|metric, _| metrics.contains(metric));

    PeerAnalysis {
        cohort: CohortSummary::from(&cohort),
        averages: average(&members, metrics),
        rankings,
        generated_at,
    }
}
