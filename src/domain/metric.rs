//! Tracked financial metrics and their ranking direction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Whether a larger or smaller value is considered better for a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

/// A named scalar financial figure or ratio tracked for comparison.
///
/// Declaration order is the canonical order used for persisted maps and
/// for CLI listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    TotalAssets,
    TotalLoans,
    TotalDeposits,
    TotalEquity,
    NetIncome,
    NetInterestIncome,
    NoninterestIncome,
    NoninterestExpense,
    Roe,
    Roa,
    Nim,
    EfficiencyRatio,
    OperatingLeverage,
}

impl Metric {
    /// Every tracked metric in canonical order.
    pub const ALL: [Metric; 13] = [
        Metric::TotalAssets,
        Metric::TotalLoans,
        Metric::TotalDeposits,
        Metric::TotalEquity,
        Metric::NetIncome,
        Metric::NetInterestIncome,
        Metric::NoninterestIncome,
        Metric::NoninterestExpense,
        Metric::Roe,
        Metric::Roa,
        Metric::Nim,
        Metric::EfficiencyRatio,
        Metric::OperatingLeverage,
    ];

    /// Wire name, as used in config files and persisted documents.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Metric::TotalAssets => "totalAssets",
            Metric::TotalLoans => "totalLoans",
            Metric::TotalDeposits => "totalDeposits",
            Metric::TotalEquity => "totalEquity",
            Metric::NetIncome => "netIncome",
            Metric::NetInterestIncome => "netInterestIncome",
            Metric::NoninterestIncome => "noninterestIncome",
            Metric::NoninterestExpense => "noninterestExpense",
            Metric::Roe => "roe",
            Metric::Roa => "roa",
            Metric::Nim => "nim",
            Metric::EfficiencyRatio => "efficiencyRatio",
            Metric::OperatingLeverage => "operatingLeverage",
        }
    }

    /// Human-readable label for tables.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Metric::TotalAssets => "Total assets",
            Metric::TotalLoans => "Total loans",
            Metric::TotalDeposits => "Total deposits",
            Metric::TotalEquity => "Total equity",
            Metric::NetIncome => "Net income",
            Metric::NetInterestIncome => "Net interest income",
            Metric::NoninterestIncome => "Noninterest income",
            Metric::NoninterestExpense => "Noninterest expense",
            Metric::Roe => "Return on equity",
            Metric::Roa => "Return on assets",
            Metric::Nim => "Net interest margin",
            Metric::EfficiencyRatio => "Efficiency ratio",
            Metric::OperatingLeverage => "Operating leverage",
        }
    }

    /// Ranking direction. Only the efficiency ratio is lower-is-better.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        match self {
            Metric::EfficiencyRatio => Direction::LowerIsBetter,
            _ => Direction::HigherIsBetter,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .collect::<String>()
        .to_ascii_lowercase()
}

impl FromStr for Metric {
    type Err = DomainError;

    /// Accepts the camelCase wire name as well as snake_case or kebab-case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        Metric::ALL
            .into_iter()
            .find(|metric| metric.as_str().to_ascii_lowercase() == wanted)
            .ok_or_else(|| DomainError::UnknownMetric {
                name: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_efficiency_ratio_is_lower_is_better() {
        let lower: Vec<Metric> = Metric::ALL
            .into_iter()
            .filter(|m| m.direction() == Direction::LowerIsBetter)
            .collect();
        assert_eq!(lower, vec![Metric::EfficiencyRatio]);
    }

    #[test]
    fn parses_wire_and_snake_case_names() {
        assert_eq!("efficiencyRatio".parse::<Metric>().unwrap(), Metric::EfficiencyRatio);
        assert_eq!("efficiency_ratio".parse::<Metric>().unwrap(), Metric::EfficiencyRatio);
        assert_eq!("net-interest-income".parse::<Metric>().unwrap(), Metric::NetInterestIncome);
        assert_eq!("ROA".parse::<Metric>().unwrap(), Metric::Roa);
    }

    #[test]
    fn rejects_unknown_names() {
        let err = "leverage".parse::<Metric>().unwrap_err();
        assert_eq!(
            err,
            DomainError::UnknownMetric {
                name: "leverage".to_string()
            }
        );
    }

    #[test]
    fn serde_uses_wire_names() {
        for metric in Metric::ALL {
            let json = serde_json::to_string(&metric).unwrap();
            assert_eq!(json, format!("\"{}\"", metric.as_str()));
        }
    }
}
