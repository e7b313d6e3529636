//! SQLite persistence adapter.
//!
//! Provides the SQLite-backed statement store using Diesel ORM.

pub mod database;
pub mod store;

pub use store::SqliteStore;
