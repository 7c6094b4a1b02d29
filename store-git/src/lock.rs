//! OS-level advisory exclusive lock over a repository directory, backing
//! the single-transaction-at-a-time rule the core's concurrency model
//! requires.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::StorageError;

/// Held for the lifetime of one [`crate::GitStore`]. Dropping it releases
/// the advisory lock; the lock file itself is left in place (its presence
/// is not meaningful, only its lock state is).
pub struct RepoLock {
    file: File,
    path: PathBuf,
}

impl RepoLock {
    /// Acquires the lock at `{repo_dir}/.lock`, creating the file if
    /// needed. Returns [`StorageError::Locked`] (mapped to
    /// [`graph_core::GraphError::Locked`] by the caller) if another
    /// process already holds it.
    pub fn acquire(repo_dir: &Path) -> Result<Self, StorageError> {
        let path = repo_dir.join(".lock");
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&path)?;
        file.try_lock_exclusive()
            .map_err(|_| StorageError::Locked(path.clone()))?;
        Ok(Self { file, path: path.clone() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RepoLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}
