//! Application services (use cases).
//!
//! These services combine the pure domain logic with the store port to
//! implement the peer analysis run.

pub mod batch;
pub mod peer;
pub mod ranking;

pub use batch::{BatchOrchestrator, BatchSettings, EmptyInstitutionPolicy, RunSummary};
pub use ranking::{rank_all, RankingTable};
