//! Single-instance run lock.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Exclusive lock file held for the duration of a run.
///
/// The file is created with `create_new`, so a second run against the same
/// path fails until the first one drops its guard.
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
}

impl RunLock {
    /// Take the lock at `path`.
    ///
    /// # Errors
    /// Returns [`Error::AlreadyRunning`] if the file exists, or an I/O error.
    pub fn acquire(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(Error::AlreadyRunning { path });
            }
            Err(e) => return Err(e.into()),
        };
        writeln!(file, "{} {}", std::process::id(), Utc::now().to_rfc3339())?;

        debug!(path = %path.display(), "Run lock acquired");
        Ok(Self { path })
    }

    /// The `pid timestamp` line written by whoever holds the lock at `path`.
    ///
    /// `None` when the file is missing, unreadable or empty.
    #[must_use]
    pub fn holder(path: impl AsRef<Path>) -> Option<String> {
        let contents = fs::read_to_string(path).ok()?;
        let line = contents.lines().next()?.trim();
        (!line.is_empty()).then(|| line.to_string())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "Failed to remove run lock");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn second_acquire_fails_while_held() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bankpeer.lock");

        let lock = RunLock::acquire(&path).unwrap();
        assert!(path.exists());

        let err = RunLock::acquire(&path).unwrap_err();
        assert!(matches!(err, Error::AlreadyRunning { .. }));

        drop(lock);
        assert!(!path.exists());
        assert!(RunLock::acquire(&path).is_ok());
    }

    #[test]
    fn holder_reads_the_recorded_pid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bankpeer.lock");
        assert_eq!(RunLock::holder(&path), None);

        let lock = RunLock::acquire(&path).unwrap();
        let holder = RunLock::holder(lock.path()).unwrap();
        assert!(holder.starts_with(&format!("{} ", std::process::id())));
    }
}
