//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!                    │  selector · averager ·  │
//!                    │  ranking · batch run    │
//!                    └────────────┬────────────┘
//!                                 │ StatementStore
//!                                 ▼
//!                 ┌───────────────────────────────┐
//!                 │  MemoryStore  │  SqliteStore  │
//!                 └───────────────────────────────┘
//! ```

pub mod outbound;

pub use outbound::store::{StatementCatalog, StatementStore};
