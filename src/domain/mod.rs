//! Store-agnostic domain types: institutions, statements, metrics and the
//! peer analysis written back for each period.

pub mod analysis;
pub mod cohort;
pub mod error;
pub mod extract;
pub mod id;
pub mod metric;
pub mod statement;

pub use analysis::{percentile, CohortSummary, PeerAnalysis, PeerAverages, Ranking};
pub use cohort::{PeerCohort, SizePoint};
pub use error::DomainError;
pub use extract::{extract, extract_all};
pub use id::{InstitutionId, ReportingPeriod};
pub use metric::{Direction, Metric};
pub use statement::{
    AssetSchedule, BalanceSheet, DepositSchedule, EquitySchedule, FinancialStatement,
    IncomeStatement, Institution, InterestSchedule, LiabilitySchedule, LoanSchedule,
    NoninterestSchedule, Ratios,
};
