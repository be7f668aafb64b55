//! Advisory file locks serializing writers of one key.
//!
//! Cross-platform (fs2) exclusive locks. Two lock files exist:
//! - `<version>/.history.lock` guards latest-then-append for one entity key
//! - `<project>/.manifest.lock` guards project manifest replacement
//!
//! Neither name matches the timestamp pattern, so history listing ignores
//! them. Lock is released on Drop.

use crate::errors::{io_error, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

pub const HISTORY_LOCK_FILE: &str = ".history.lock";
pub const MANIFEST_LOCK_FILE: &str = ".manifest.lock";

pub struct LockGuard {
    file: File,
    path: PathBuf,
}

impl LockGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

/// Acquire an exclusive lock on `path`, creating the file if needed.
/// Blocks until acquired.
///
/// # Errors
///
/// `StorageFailure` if the lock file cannot be opened or locked.
pub fn acquire_exclusive(path: &Path) -> Result<LockGuard> {
    let file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(path)
        .map_err(|e| io_error("open_lock", path, e))?;
    file.lock_exclusive()
        .map_err(|e| io_error("lock_exclusive", path, e))?;
    Ok(LockGuard {
        file,
        path: path.to_path_buf(),
    })
}

/// Like `acquire_exclusive`, but `None` when locking is disabled.
///
/// # Errors
///
/// See [`acquire_exclusive`].
pub fn acquire_if(enabled: bool, path: &Path) -> Result<Option<LockGuard>> {
    if enabled {
        acquire_exclusive(path).map(Some)
    } else {
        Ok(None)
    }
}
