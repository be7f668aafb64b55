//! Filesystem primitives shared by history and manifest code
//!
//! Artifacts are written temp-then-rename so a reader never sees a half
//! written file: it either sees the complete artifact or no artifact.

use crate::errors::{io_error, storage_error, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Atomically write bytes to a file
///
/// The parent directory must already exist.
pub fn atomic_write(target_path: &Path, content: &[u8]) -> Result<()> {
    let temp_path = target_path.with_extension("tmp");

    fs::write(&temp_path, content).map_err(|e| io_error("write_temp", &temp_path, e))?;

    if let Err(e) = fs::rename(&temp_path, target_path) {
        let _ = fs::remove_file(&temp_path);
        return Err(io_error("rename_temp", target_path, e));
    }

    Ok(())
}

/// Create a single directory level; an existing directory is fine.
///
/// # Errors
///
/// `StorageFailure` if creation fails or the path exists as a non-directory.
pub fn ensure_dir(path: &Path) -> Result<()> {
    match fs::create_dir(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            if path.is_dir() {
                Ok(())
            } else {
                Err(storage_error(
                    "create_dir",
                    path,
                    "path exists and is not a directory",
                ))
            }
        }
        Err(e) => Err(io_error("create_dir", path, e)),
    }
}

/// Read a file, mapping "not found" to `None`.
pub fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_error("read_file", path, e)),
    }
}

/// Remove a file if present. Returns whether something was removed.
pub fn remove_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(io_error("remove_file", path, e)),
    }
}
