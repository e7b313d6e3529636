//! Bankpeer - peer-group analytics for bank financial statements.
//!
//! For every institution and reporting period the crate selects a cohort of
//! similarly sized peers, averages their metrics, ranks the institution
//! against the whole period population and writes the result back next to
//! the statement.
//!
//! # Architecture
//!
//! - **`domain`** - Statements, metrics, cohorts and the persisted analysis
//! - **`port`** - [`port::StatementStore`], the persistence contract the run depends on
//! - **`application`** - Peer selection, averaging, ranking and the batch run
//! - **`adapter`** - SQLite and in-memory stores, plus the CLI
//! - **`infrastructure`** - Configuration, logging, run lock and status file
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use bankpeer::adapter::outbound::sqlite::SqliteStore;
//! use bankpeer::application::{BatchOrchestrator, BatchSettings};
//! use bankpeer::domain::Metric;
//!
//! # async fn demo() -> bankpeer::error::Result<()> {
//! let store = Arc::new(SqliteStore::open("bankpeer.db", Metric::TotalAssets)?);
//! let summary = BatchOrchestrator::new(store, BatchSettings::default()).run().await?;
//! println!("{} institutions analysed", summary.processed);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
