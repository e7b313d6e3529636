//! Analysis and batch execution settings.

use serde::{Deserialize, Serialize};

use crate::application::batch::EmptyInstitutionPolicy;
use crate::domain::Metric;

/// What the peer analysis computes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Peers selected on each side of the target (N).
    pub peer_count: usize,
    /// Metric that decides institution size.
    pub size_metric: Metric,
    /// Metrics averaged over the cohort and ranked over the population.
    pub metrics: Vec<Metric>,
    /// Handling of institutions without reporting periods.
    pub empty_institutions: EmptyInstitutionPolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            peer_count: 10,
            size_metric: Metric::TotalAssets,
            metrics: Metric::ALL.to_vec(),
            empty_institutions: EmptyInstitutionPolicy::Skip,
        }
    }
}

/// How the batch run executes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Institutions processed concurrently.
    pub workers: usize,
    /// Share each period's population between institutions within a run.
    ///
    /// Cached snapshots live until the run ends, so memory grows with the
    /// number of distinct periods touched.
    pub cache_periods: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: 10,
            cache_periods: true,
        }
    }
}
