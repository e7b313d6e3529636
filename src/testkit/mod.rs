//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`domain`] - Statement builders and period helpers.
//! - [`store`] - Store wrappers that count reads, inject failures or
//!   record writes around a real [`StatementStore`](crate::port::StatementStore).

pub mod domain;
pub mod store;
