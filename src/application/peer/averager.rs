//! Null-tolerant peer averaging.

use crate::domain::{extract, FinancialStatement, Metric, PeerAverages};

/// Mean of each metric over the cohort members that have an applicable value.
///
/// Members lacking a metric do not count towards its denominator; a metric
/// with no applicable values at all is reported as not applicable.
#[must_use]
pub fn average(cohort: &[&FinancialStatement], metrics: &[Metric]) -> PeerAverages {
    let mut averages = PeerAverages::empty(metrics);
    for &metric in metrics {
        let (sum, count) = cohort
            .iter()
            .filter_map(|statement| extract(statement, metric))
            .fold((0.0_f64, 0_usize), |(sum, count), value| (sum + value, count + 1));

        let mean = (count > 0).then(|| sum / count as f64);
        averages.insert(metric, mean);
    }
    averages
}
