//! Infrastructure: configuration, run lock and status reporting.

pub mod config;
pub mod lock;
pub mod status;
