//! Domain validation errors for core domain types.
//!
//! These errors are returned by parsing constructors when an input cannot
//! be turned into a valid domain value.

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The metric name is not part of the tracked metric set.
    #[error("unknown metric '{name}'")]
    UnknownMetric {
        /// The name that failed to parse.
        name: String,
    },

    /// The reporting period is not a valid `YYYY-MM-DD` date.
    #[error("invalid reporting period '{value}'")]
    InvalidPeriod {
        /// The rejected input.
        value: String,
    },

    /// Peer cohorts need at least one peer per side.
    #[error("peer count must be at least 1, got {count}")]
    InvalidPeerCount {
        /// The rejected peer count.
        count: usize,
    },
}
