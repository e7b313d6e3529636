//! CLI module graph.

pub mod command;
pub mod config;
pub mod diagnostic;
pub mod import;
pub mod metrics;
pub mod output;
pub mod run;
pub mod show;
