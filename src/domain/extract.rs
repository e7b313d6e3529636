//! Metric extraction from statement documents.
//!
//! Each metric maps to one accessor that walks the optional schedule tree.
//! Accessors never fail: a missing branch or a non-finite number yields
//! `None`, the "not applicable" state.

use super::metric::Metric;
use super::statement::FinancialStatement;

/// Pure accessor projecting one scalar out of a statement.
pub type Accessor = fn(&FinancialStatement) -> Option<f64>;

/// Accessor for a metric.
#[must_use]
pub fn accessor(metric: Metric) -> Accessor {
    match metric {
        Metric::TotalAssets => total_assets,
        Metric::TotalLoans => total_loans,
        Metric::TotalDeposits => total_deposits,
        Metric::TotalEquity => total_equity,
        Metric::NetIncome => net_income,
        Metric::NetInterestIncome => net_interest_income,
        Metric::NoninterestIncome => noninterest_income,
        Metric::NoninterestExpense => noninterest_expense,
        Metric::Roe => roe,
        Metric::Roa => roa,
        Metric::Nim => nim,
        Metric::EfficiencyRatio => efficiency_ratio,
        Metric::OperatingLeverage => operating_leverage,
    }
}

/// Extract a metric, returning `None` when it is not applicable.
#[must_use]
pub fn extract(statement: &FinancialStatement, metric: Metric) -> Option<f64> {
    accessor(metric)(statement).filter(|value| value.is_finite())
}

/// Extract several metrics at once, preserving the requested order.
#[must_use]
pub fn extract_all(statement: &FinancialStatement, metrics: &[Metric]) -> Vec<(Metric, Option<f64>)> {
    metrics
        .iter()
        .map(|&metric| (metric, extract(statement, metric)))
        .collect()
}

fn total_assets(s: &FinancialStatement) -> Option<f64> {
    s.balance_sheet.as_ref()?.assets.as_ref()?.total_assets
}

fn total_loans(s: &FinancialStatement) -> Option<f64> {
    s.balance_sheet.as_ref()?.assets.as_ref()?.loans.as_ref()?.total_loans
}

fn total_deposits(s: &FinancialStatement) -> Option<f64> {
    s.balance_sheet
        .as_ref()?
        .liabilities
        .as_ref()?
        .deposits
        .as_ref()?
        .total_deposits
}

fn total_equity(s: &FinancialStatement) -> Option<f64> {
    s.balance_sheet.as_ref()?.equity.as_ref()?.total_equity
}

fn net_income(s: &FinancialStatement) -> Option<f64> {
    s.income_statement.as_ref()?.net_income
}

fn net_interest_income(s: &FinancialStatement) -> Option<f64> {
    s.income_statement
        .as_ref()?
        .interest
        .as_ref()?
        .net_interest_income
}

fn noninterest_income(s: &FinancialStatement) -> Option<f64> {
    s.income_statement.as_ref()?.noninterest.as_ref()?.income
}

fn noninterest_expense(s: &FinancialStatement) -> Option<f64> {
    s.income_statement.as_ref()?.noninterest.as_ref()?.expense
}

fn roe(s: &FinancialStatement) -> Option<f64> {
    s.ratios.as_ref()?.roe
}

fn roa(s: &FinancialStatement) -> Option<f64> {
    s.ratios.as_ref()?.roa
}

fn nim(s: &FinancialStatement) -> Option<f64> {
    s.ratios.as_ref()?.nim
}

fn efficiency_ratio(s: &FinancialStatement) -> Option<f64> {
    s.ratios.as_ref()?.efficiency_ratio
}

fn operating_leverage(s: &FinancialStatement) -> Option<f64> {
    s.ratios.as_ref()?.operating_leverage
}
