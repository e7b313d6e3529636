//! Domain identifier types with proper encapsulation.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Institution identifier - opaque key assigned by the statement population.
///
/// The inner String is private to ensure all construction goes through
/// the defined constructors.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstitutionId(String);

impl InstitutionId {
    /// Create a new `InstitutionId` from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the institution ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstitutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for InstitutionId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for InstitutionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Reporting period: the quarter-end date a statement snapshot was taken at.
///
/// Serialized as `YYYY-MM-DD`, which also sorts lexically in period order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportingPeriod(NaiveDate);

impl ReportingPeriod {
    /// Create a period from a calendar date.
    #[must_use]
    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Create a period from year, month and day.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidPeriod`] if the date does not exist.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, DomainError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| DomainError::InvalidPeriod {
                value: format!("{year:04}-{month:02}-{day:02}"),
            })
    }

    /// The underlying calendar date.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for ReportingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for ReportingPeriod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Self)
            .map_err(|_| DomainError::InvalidPeriod {
                value: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_parses_and_displays_iso_dates() {
        let period: ReportingPeriod = "2024-03-31".parse().unwrap();
        assert_eq!(period.to_string(), "2024-03-31");
        assert_eq!(period, ReportingPeriod::from_ymd(2024, 3, 31).unwrap());
    }

    #[test]
    fn period_rejects_impossible_dates() {
        assert!("2024-02-30".parse::<ReportingPeriod>().is_err());
        assert!(ReportingPeriod::from_ymd(2023, 13, 1).is_err());
    }

    #[test]
    fn periods_order_chronologically() {
        let q1: ReportingPeriod = "2023-12-31".parse().unwrap();
        let q2: ReportingPeriod = "2024-03-31".parse().unwrap();
        assert!(q1 < q2);
    }

    #[test]
    fn period_serializes_as_plain_string() {
        let period: ReportingPeriod = "2024-06-30".parse().unwrap();
        assert_eq!(serde_json::to_string(&period).unwrap(), "\"2024-06-30\"");
    }
}
