use std::path::{Path, PathBuf};

use bankpeer::adapter::outbound::sqlite::SqliteStore;
use bankpeer::domain::Metric;
use tempfile::TempDir;

/// Temporary SQLite database file for integration tests.
///
/// The directory and everything in it is removed on drop.
pub struct TempDb {
    dir: TempDir,
    path: PathBuf,
}

impl TempDb {
    pub fn create(name: &str) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join(format!("{name}.db"));
        Self { dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn url(&self) -> String {
        self.path.display().to_string()
    }

    /// Open a store on this database, running migrations.
    pub fn open(&self) -> SqliteStore {
        SqliteStore::open(&self.url(), Metric::TotalAssets).expect("open sqlite store")
    }
}
