//! The batch peer analysis run.
//!
//! - [`orchestrator`] - Worker pool driving the run over the population.
//! - [`cache`] - Period snapshots shared between workers.
//! - [`analyze`] - Analysis of one institution at one period.
//! - [`summary`] - Run and per-institution outcomes.

pub mod analyze;
pub mod cache;
pub mod orchestrator;
pub mod summary;

pub use analyze::analyze_period;
pub use cache::{PeriodCache, PeriodSnapshot};
pub use orchestrator::{BatchOrchestrator, BatchSettings, EmptyInstitutionPolicy};
pub use summary::{FailureRecord, InstitutionOutcome, InstitutionState, RunState, RunSummary};
