//! Builders for statements and periods used across tests.
//!
//! [`StatementBuilder`] fills only the schedules a test touches, so every
//! other metric reads as not applicable.

use crate::domain::{
    AssetSchedule, BalanceSheet, DepositSchedule, EquitySchedule, FinancialStatement,
    IncomeStatement, Institution, InstitutionId, InterestSchedule, LiabilitySchedule,
    LoanSchedule, Metric, NoninterestSchedule, Ratios, ReportingPeriod,
};

/// Parse a `YYYY-MM-DD` period, panicking on malformed test input.
pub fn period(value: &str) -> ReportingPeriod {
    value.parse().expect("valid test period")
}

/// Create an [`Institution`] named after its id.
pub fn institution(id: &str) -> Institution {
    Institution::new(id, format!("{id} Bank"))
}

/// Incremental builder for [`FinancialStatement`].
#[derive(Debug, Clone)]
pub struct StatementBuilder {
    statement: FinancialStatement,
}

impl StatementBuilder {
    pub fn new(id: impl Into<InstitutionId>, period: ReportingPeriod) -> Self {
        Self {
            statement: FinancialStatement::new(id, period),
        }
    }

    /// Set any metric by name.
    pub fn metric(self, metric: Metric, value: f64) -> Self {
        match metric {
            Metric::TotalAssets => self.total_assets(value),
            Metric::TotalLoans => self.total_loans(value),
            Metric::TotalDeposits => self.total_deposits(value),
            Metric::TotalEquity => self.total_equity(value),
            Metric::NetIncome => self.net_income(value),
            Metric::NetInterestIncome => self.net_interest_income(value),
            Metric::NoninterestIncome => self.noninterest_income(value),
            Metric::NoninterestExpense => self.noninterest_expense(value),
            Metric::Roe => self.roe(value),
            Metric::Roa => self.roa(value),
            Metric::Nim => self.nim(value),
            Metric::EfficiencyRatio => self.efficiency_ratio(value),
            Metric::OperatingLeverage => self.operating_leverage(value),
        }
    }

    pub fn total_assets(mut self, value: f64) -> Self {
        self.assets().total_assets = Some(value);
        self
    }

    pub fn total_loans(mut self, value: f64) -> Self {
        self.assets()
            .loans
            .get_or_insert_with(LoanSchedule::default)
            .total_loans = Some(value);
        self
    }

    pub fn total_deposits(mut self, value: f64) -> Self {
        self.balance_sheet()
            .liabilities
            .get_or_insert_with(LiabilitySchedule::default)
            .deposits
            .get_or_insert_with(DepositSchedule::default)
            .total_deposits = Some(value);
        self
    }

    pub fn total_equity(mut self, value: f64) -> Self {
        self.balance_sheet()
            .equity
            .get_or_insert_with(EquitySchedule::default)
            .total_equity = Some(value);
        self
    }

    pub fn net_income(mut self, value: f64) -> Self {
        self.income().net_income = Some(value);
        self
    }

    pub fn net_interest_income(mut self, value: f64) -> Self {
        self.income()
            .interest
            .get_or_insert_with(InterestSchedule::default)
            .net_interest_income = Some(value);
        self
    }

    pub fn noninterest_income(mut self, value: f64) -> Self {
        self.noninterest().income = Some(value);
        self
    }

    pub fn noninterest_expense(mut self, value: f64) -> Self {
        self.noninterest().expense = Some(value);
        self
    }

    pub fn roe(mut self, value: f64) -> Self {
        self.ratios().roe = Some(value);
        self
    }

    pub fn roa(mut self, value: f64) -> Self {
        self.ratios().roa = Some(value);
        self
    }

    pub fn nim(mut self, value: f64) -> Self {
        self.ratios().nim = Some(value);
        self
    }

    pub fn efficiency_ratio(mut self, value: f64) -> Self {
        self.ratios().efficiency_ratio = Some(value);
        self
    }

    pub fn operating_leverage(mut self, value: f64) -> Self {
        self.ratios().operating_leverage = Some(value);
        self
    }

    pub fn build(self) -> FinancialStatement {
        self.statement
    }

    fn balance_sheet(&mut self) -> &mut BalanceSheet {
        self.statement
            .balance_sheet
            .get_or_insert_with(BalanceSheet::default)
    }

    fn assets(&mut self) -> &mut AssetSchedule {
        self.balance_sheet()
            .assets
            .get_or_insert_with(AssetSchedule::default)
    }

    fn income(&mut self) -> &mut IncomeStatement {
        self.statement
            .income_statement
            .get_or_insert_with(IncomeStatement::default)
    }

    fn noninterest(&mut self) -> &mut NoninterestSchedule {
        self.income()
            .noninterest
            .get_or_insert_with(NoninterestSchedule::default)
    }

    fn ratios(&mut self) -> &mut Ratios {
        self.statement.ratios.get_or_insert_with(Ratios::default)
    }
}
