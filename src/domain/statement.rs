//! Institutions and their per-period financial statements.
//!
//! Statements are populated externally from regulatory filings. Every level
//! of the schedule tree is optional: filings regularly omit whole schedules,
//! and a missing branch must read as "not applicable" rather than fail.

use serde::{Deserialize, Serialize};

use super::analysis::PeerAnalysis;
use super::id::{InstitutionId, ReportingPeriod};

/// A financial institution subject to per-period analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Institution {
    pub id: InstitutionId,
    pub name: String,
}

impl Institution {
    pub fn new(id: impl Into<InstitutionId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One statement snapshot for an (institution, period) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatement {
    pub institution_id: InstitutionId,
    pub period: ReportingPeriod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_sheet: Option<BalanceSheet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income_statement: Option<IncomeStatement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratios: Option<Ratios>,
    /// Derived field written back by the peer analysis run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peer_analysis: Option<PeerAnalysis>,
}

impl FinancialStatement {
    /// Create an empty statement with no schedules filled in.
    pub fn new(institution_id: impl Into<InstitutionId>, period: ReportingPeriod) -> Self {
        Self {
            institution_id: institution_id.into(),
            period,
            balance_sheet: None,
            income_statement: None,
            ratios: None,
            peer_analysis: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<AssetSchedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liabilities: Option<LiabilitySchedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equity: Option<EquitySchedule>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetSchedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_assets: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loans: Option<LoanSchedule>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanSchedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_loans: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiabilitySchedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposits: Option<DepositSchedule>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DepositSchedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_deposits: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquitySchedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_equity: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomeStatement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_income: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest: Option<InterestSchedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noninterest: Option<NoninterestSchedule>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterestSchedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_interest_income: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoninterestSchedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expense: Option<f64>,
}

/// Ratios as reported on the filing, in percent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ratios {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roe: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roa: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nim: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub efficiency_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_leverage: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_sparse_documents() {
        let json = r#"{
            "institution_id": "bank-1",
            "period": "2024-03-31",
            "balance_sheet": { "assets": { "total_assets": 1250.5 } },
            "ratios": { "roa": null }
        }"#;

        let statement: FinancialStatement = serde_json::from_str(json).unwrap();
        assert_eq!(statement.institution_id.as_str(), "bank-1");
        let assets = statement
            .balance_sheet
            .as_ref()
            .and_then(|b| b.assets.as_ref())
            .and_then(|a| a.total_assets);
        assert_eq!(assets, Some(1250.5));
        assert!(statement.income_statement.is_none());
        assert_eq!(statement.ratios.unwrap().roa, None);
    }
}
