//! Peer analysis results persisted alongside each statement.
//!
//! A [`PeerAnalysis`] is always rebuilt from scratch; nothing from a prior
//! run is merged into it.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cohort::PeerCohort;
use super::id::InstitutionId;
use super::metric::Metric;

/// Mean of each metric across a cohort's applicable values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerAverages(BTreeMap<Metric, Option<f64>>);

impl PeerAverages {
    /// Averages with every requested metric set to not applicable.
    pub fn empty(metrics: &[Metric]) -> Self {
        Self(metrics.iter().map(|&m| (m, None)).collect())
    }

    pub fn insert(&mut self, metric: Metric, value: Option<f64>) {
        self.0.insert(metric, value);
    }

    /// Average for a metric; `None` when not applicable or not tracked.
    #[must_use]
    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.0.get(&metric).copied().flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, Option<f64>)> + '_ {
        self.0.iter().map(|(&m, &v)| (m, v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An institution's standing for one metric across the whole period population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    /// 1-based position, best first. Zero when the institution has no value.
    pub rank: usize,
    /// Population members with an applicable value.
    pub total: usize,
    /// 0-100, where 100 is best.
    pub percentile: Option<u8>,
    /// The institution's own value.
    pub value: Option<f64>,
}

impl Ranking {
    /// A ranked entry. `rank` must be within `1..=total`.
    #[must_use]
    pub fn ranked(rank: usize, total: usize, value: f64) -> Self {
        Self {
            rank,
            total,
            percentile: percentile(rank, total),
            value: Some(value),
        }
    }

    /// Entry for an institution that does not participate in the ordering.
    #[must_use]
    pub const fn unranked(total: usize) -> Self {
        Self {
            rank: 0,
            total,
            percentile: None,
            value: None,
        }
    }

    #[must_use]
    pub const fn is_ranked(&self) -> bool {
        self.rank > 0
    }
}

/// `round((total - rank + 1) / total * 100)`, undefined without a rank.
#[must_use]
pub fn percentile(rank: usize, total: usize) -> Option<u8> {
    if total == 0 || rank == 0 || rank > total {
        return None;
    }
    let share = (total - rank + 1) as f64 / total as f64;
    // share is in (0, 1], so the rounded value fits in 0..=100.
    Some((share * 100.0).round() as u8)
}

/// Persisted view of the peer cohort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortSummary {
    pub larger_count: usize,
    pub smaller_count: usize,
    pub total: usize,
    pub larger_ids: Vec<InstitutionId>,
    pub smaller_ids: Vec<InstitutionId>,
    /// Union of both sides, larger peers first.
    pub peer_ids: Vec<InstitutionId>,
}

impl From<&PeerCohort> for CohortSummary {
    fn from(cohort: &PeerCohort) -> Self {
        Self {
            larger_count: cohort.larger.len(),
            smaller_count: cohort.smaller.len(),
            total: cohort.len(),
            larger_ids: cohort.larger.clone(),
            smaller_ids: cohort.smaller.clone(),
            peer_ids: cohort.members().cloned().collect(),
        }
    }
}

/// Derived comparison for one (institution, period).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerAnalysis {
    pub cohort: CohortSummary,
    pub averages: PeerAverages,
    pub rankings: BTreeMap<Metric, Ranking>,
    pub generated_at: DateTime<Utc>,
}

impl PeerAnalysis {
    /// True when everything but the generation timestamp matches.
    #[must_use]
    pub fn same_figures(&self, other: &Self) -> bool {
        self.cohort == other.cohort
            && self.averages == other.averages
            && self.rankings == other.rankings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_rank_is_hundredth_percentile() {
        assert_eq!(percentile(1, 18), Some(100));
        assert_eq!(percentile(1, 1), Some(100));
    }

    #[test]
    fn percentile_rounds_half_up() {
        // (8 - 4 + 1) / 8 = 62.5%
        assert_eq!(percentile(4, 8), Some(63));
        assert_eq!(percentile(8, 8), Some(13));
        assert_eq!(percentile(3, 3), Some(33));
    }

    #[test]
    fn percentile_is_undefined_without_population_or_rank() {
        assert_eq!(percentile(0, 0), None);
        assert_eq!(percentile(0, 10), None);
        assert_eq!(percentile(11, 10), None);
    }

    #[test]
    fn averages_distinguish_missing_from_not_applicable() {
        let mut averages = PeerAverages::empty(&[Metric::Roa]);
        assert_eq!(averages.len(), 1);
        assert_eq!(averages.get(Metric::Roa), None);
        averages.insert(Metric::Roa, Some(1.1));
        assert_eq!(averages.get(Metric::Roa), Some(1.1));
        assert_eq!(averages.get(Metric::Nim), None);
    }

    #[test]
    fn cohort_summary_keeps_side_order() {
        let cohort = PeerCohort {
            larger: vec!["b".into(), "a".into()],
            smaller: vec!["c".into()],
        };
        let summary = CohortSummary::from(&cohort);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.larger_count, 2);
        assert_eq!(summary.smaller_count, 1);
        assert_eq!(
            summary.peer_ids,
            vec![
                InstitutionId::new("b"),
                InstitutionId::new("a"),
                InstitutionId::new("c")
            ]
        );
    }
}
