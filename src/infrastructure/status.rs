//! Status file for external monitoring.
//!
//! After each run a JSON document with the run summary is written so that
//! schedulers and dashboards can poll the outcome without parsing logs.

use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::batch::RunSummary;
use crate::domain::Metric;
use crate::error::Result;

/// Current status file format version.
const STATUS_VERSION: &str = "1";

/// Top-level status file structure.
#[derive(Debug, Clone, Serialize)]
pub struct StatusFile<'a> {
    /// Schema version for forward compatibility.
    pub version: &'static str,
    /// Process ID of the run.
    pub pid: u32,
    /// Settings the run used.
    pub config: StatusConfig,
    pub summary: &'a RunSummary,
    /// When this file was written.
    pub updated_at: DateTime<Utc>,
}

/// Static configuration snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct StatusConfig {
    pub database: String,
    pub peer_count: usize,
    pub size_metric: Metric,
    pub metrics: Vec<Metric>,
    pub workers: usize,
}

impl<'a> StatusFile<'a> {
    #[must_use]
    pub fn new(config: StatusConfig, summary: &'a RunSummary) -> Self {
        Self {
            version: STATUS_VERSION,
            pid: std::process::id(),
            config,
            summary,
            updated_at: Utc::now(),
        }
    }

    /// Write the status to `path` atomically.
    ///
    /// Uses write-to-temp-then-rename; creates the parent directory if needed.
    ///
    /// # Errors
    /// Returns an error if serialization or any file operation fails.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;

        let cleanup_and_err = |e| {
            let _ = fs::remove_file(&temp_path);
            e
        };

        file.write_all(json.as_bytes()).map_err(cleanup_and_err)?;
        file.sync_all().map_err(cleanup_and_err)?;
        fs::rename(&temp_path, path).map_err(cleanup_and_err)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn config() -> StatusConfig {
        StatusConfig {
            database: "peers.db".to_string(),
            peer_count: 10,
            size_metric: Metric::TotalAssets,
            metrics: vec![Metric::Roa],
            workers: 4,
        }
    }

    #[test]
    fn writes_summary_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("status.json");
        let mut summary = RunSummary::new(Uuid::nil(), Utc::now(), 3, false);
        summary.processed = 3;
        summary.finish(Utc::now(), false);

        StatusFile::new(config(), &summary).write(&path).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["version"], "1");
        assert_eq!(written["config"]["size_metric"], "totalAssets");
        assert_eq!(written["summary"]["processed"], 3);
        assert_eq!(written["summary"]["state"], "finished");
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn overwrites_previous_status() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("status.json");
        let first = RunSummary::new(Uuid::nil(), Utc::now(), 1, false);
        let second = RunSummary::new(Uuid::nil(), Utc::now(), 7, true);

        StatusFile::new(config(), &first).write(&path).unwrap();
        StatusFile::new(config(), &second).write(&path).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["summary"]["total"], 7);
        assert_eq!(written["summary"]["dry_run"], true);
    }
}
