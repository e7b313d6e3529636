//! Period populations shaped for cohort and ranking scenarios.

use bankpeer::domain::{FinancialStatement, ReportingPeriod};
use bankpeer::port::StatementCatalog;
use bankpeer::testkit::domain::{institution, StatementBuilder};

pub const TARGET: &str = "target";
pub const TARGET_SIZE: f64 = 1_000.0;

/// A statement with total assets and a roa derived from the size.
pub fn sized(id: &str, period: ReportingPeriod, size: f64) -> FinancialStatement {
    StatementBuilder::new(id, period)
        .total_assets(size)
        .roa(size / 100_000.0)
        .efficiency_ratio(50.0 + size / 1_000.0)
        .build()
}

/// `larger` institutions above the target and `smaller` below it.
///
/// Larger peers are `l01..` at target+1, target+2, ...; smaller peers are
/// `s01..` at target-1, target-2, ...
pub fn around_target(period: ReportingPeriod, larger: usize, smaller: usize) -> Vec<FinancialStatement> {
    let mut statements = vec![sized(TARGET, period, TARGET_SIZE)];
    for i in 1..=larger {
        statements.push(sized(&format!("l{i:02}"), period, TARGET_SIZE + i as f64));
    }
    for i in 1..=smaller {
        statements.push(sized(&format!("s{i:02}"), period, TARGET_SIZE - i as f64));
    }
    statements
}

pub fn ids(prefix: &str, count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("{prefix}{i:02}")).collect()
}

/// Write institutions and statements through the catalog port.
pub async fn seed<C: StatementCatalog>(catalog: &C, statements: &[FinancialStatement]) {
    for statement in statements {
        catalog
            .upsert_institution(&institution(statement.institution_id.as_str()))
            .await
            .expect("upsert institution");
        catalog
            .upsert_statement(statement)
            .await
            .expect("upsert statement");
    }
}
