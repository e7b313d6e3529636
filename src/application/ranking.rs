//! Population-wide ranking.
//!
//! A [`RankingTable`] sorts each metric's column once per period and indexes
//! every institution's position. Ranking any number of institutions in that
//! period is then a lookup, so the population is never rescanned per target.

use std::collections::{BTreeMap, HashMap};

use crate::domain::{extract, Direction, FinancialStatement, InstitutionId, Metric, Ranking};

/// One metric's applicable values in rank order, best first.
#[derive(Debug, Clone, Default)]
struct RankedColumn {
    order: Vec<(InstitutionId, f64)>,
    positions: HashMap<InstitutionId, usize>,
}

impl RankedColumn {
    fn build(statements: &[FinancialStatement], metric: Metric) -> Self {
        let mut order: Vec<(InstitutionId, f64)> = statements
            .iter()
            .filter_map(|s| extract(s, metric).map(|v| (s.institution_id.clone(), v)))
            .collect();

        // Equal values fall back to institution id so ranks are reproducible.
        match metric.direction() {
            Direction::HigherIsBetter => {
                order.sort_by(|(a_id, a), (b_id, b)| b.total_cmp(a).then_with(|| a_id.cmp(b_id)));
            }
            Direction::LowerIsBetter => {
                order.sort_by(|(a_id, a), (b_id, b)| a.total_cmp(b).then_with(|| a_id.cmp(b_id)));
            }
        }

        let mut positions = HashMap::with_capacity(order.len());
        for (index, (id, _)) in order.iter().enumerate() {
            positions.entry(id.clone()).or_insert(index);
        }

        Self { order, positions }
    }

    fn ranking(&self, id: &InstitutionId) -> Ranking {
        let total = self.order.len();
        match self.positions.get(id) {
            Some(&index) => Ranking::ranked(index + 1, total, self.order[index].1),
            None => Ranking::unranked(total),
        }
    }
}

/// Ranked columns for every tracked metric at one period.
#[derive(Debug, Clone, Default)]
pub struct RankingTable {
    columns: BTreeMap<Metric, RankedColumn>,
}

impl RankingTable {
    /// Sort every metric column of a period's statements.
    #[must_use]
    pub fn build(statements: &[FinancialStatement], metrics: &[Metric]) -> Self {
        let columns = metrics
            .iter()
            .map(|&metric| (metric, RankedColumn::build(statements, metric)))
            .collect();
        Self { columns }
    }

    /// Ranking of one institution for one metric.
    ///
    /// Metrics that were not part of the table rank against an empty population.
    #[must_use]
    pub fn ranking(&self, metric: Metric, id: &InstitutionId) -> Ranking {
        self.columns
            .get(&metric)
            .map_or(Ranking::unranked(0), |column| column.ranking(id))
    }

    /// Rankings of one institution for every metric in the table.
    #[must_use]
    pub fn rankings_for(&self, id: &InstitutionId) -> BTreeMap<Metric, Ranking> {
        self.columns
            .iter()
            .map(|(&metric, column)| (metric, column.ranking(id)))
            .collect()
    }

    /// Number of population members with an applicable value.
    #[must_use]
    pub fn total(&self, metric: Metric) -> usize {
        self.columns.get(&metric).map_or(0, |c| c.order.len())
    }
}

/// Rank one institution against a period's population for every metric.
#[must_use]
pub fn rank_all(
    target: &InstitutionId,
    statements: &[FinancialStatement],
    metrics: &[Metric],
) -> BTreeMap<Metric, Ranking> {
    RankingTable::build(statements, metrics).rankings_for(target)
}
