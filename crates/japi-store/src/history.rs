//! Snapshot history: append-only, newest-first log of entries per key.
//!
//! The filesystem backend realizes one key's history as the timestamp-named
//! containers under `<version>/date/`, each holding `info.txt` (payload) and
//! `md5.txt` (fingerprint). Listing, ordering and filtering all stay inside
//! this module so another backend can implement `HistoryBackend` without
//! touching callers.

use crate::errors::{corrupt_entry, io_error, storage_error, Result};
use crate::fs_util::atomic_write;
use crate::timestamp::{Clock, Timestamp};
use japi_core::errors::JapiError;
use japi_core::fingerprint::{Fingerprint, FingerprintCodec};
use japi_core::key::{EntityKey, PathResolver};
use japi_core_types::schema::EVENT_CORRUPT_ENTRY;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Payload artifact inside a container.
pub const PAYLOAD_FILE: &str = "info.txt";
/// Fingerprint artifact inside a container.
pub const FINGERPRINT_FILE: &str = "md5.txt";

/// How many successive milliseconds `append` tries before giving up.
const MAX_ALLOCATION_ATTEMPTS: usize = 64;

/// One immutable snapshot of a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEntry {
    pub timestamp: Timestamp,
    pub fingerprint: Fingerprint,
    pub payload: Vec<u8>,
    /// The container directory this entry was read from or written to.
    pub container: PathBuf,
}

impl SnapshotEntry {
    /// The stored payload as JSON.
    ///
    /// # Errors
    ///
    /// `PayloadUnserializable` if the stored bytes are not JSON.
    pub fn payload_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_slice(&self.payload)?)
    }
}

/// Storage seam for per-key snapshot histories.
pub trait HistoryBackend: Send + Sync {
    /// The newest valid entry, or `None` if the key has no usable history.
    fn latest(&self, key: &EntityKey) -> Result<Option<SnapshotEntry>>;

    /// Every valid entry, newest first.
    fn entries(&self, key: &EntityKey) -> Result<Vec<SnapshotEntry>>;

    /// Store a new entry with a fresh, strictly increasing timestamp.
    fn append(
        &self,
        key: &EntityKey,
        fingerprint: &Fingerprint,
        payload: &[u8],
    ) -> Result<SnapshotEntry>;
}

/// Directory-listing history backend.
pub struct FsHistory {
    resolver: PathResolver,
    codec: FingerprintCodec,
    clock: Arc<dyn Clock>,
}

impl FsHistory {
    pub fn new(resolver: PathResolver, clock: Arc<dyn Clock>) -> Self {
        Self {
            resolver,
            codec: FingerprintCodec,
            clock,
        }
    }

    /// Container timestamps under `dir`, newest first.
    ///
    /// Names that are not 13-digit timestamps, and non-directories, are
    /// ignored. A missing `dir` is an empty history.
    fn list_timestamps(&self, dir: &Path) -> Result<Vec<Timestamp>> {
        let read_dir = match fs::read_dir(dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error("list_history", dir, e)),
        };

        let mut stamps = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| io_error("list_history", dir, e))?;
            let Some(ts) = entry.file_name().to_str().and_then(Timestamp::parse_name) else {
                continue;
            };
            let is_dir = entry
                .file_type()
                .map(|t| t.is_dir())
                .map_err(|e| io_error("list_history", &entry.path(), e))?;
            if is_dir {
                stamps.push(ts);
            }
        }
        stamps.sort_unstable_by(|a, b| b.cmp(a));
        Ok(stamps)
    }

    /// Read and verify one container.
    ///
    /// # Errors
    ///
    /// `CorruptHistoryEntry` if an artifact is missing or unreadable, or the
    /// fingerprint is malformed or does not match the payload.
    fn read_entry(&self, container: &Path, timestamp: Timestamp) -> Result<SnapshotEntry> {
        let payload = read_artifact(container, PAYLOAD_FILE)?;
        let stored = read_artifact(container, FINGERPRINT_FILE)?;

        let fingerprint = std::str::from_utf8(&stored)
            .ok()
            .and_then(Fingerprint::parse)
            .ok_or_else(|| corrupt_entry(container, "malformed fingerprint"))?;

        if self.codec.fingerprint(&payload) != fingerprint {
            return Err(corrupt_entry(
                container,
                "fingerprint does not match payload",
            ));
        }

        Ok(SnapshotEntry {
            timestamp,
            fingerprint,
            payload,
            container: container.to_path_buf(),
        })
    }

    /// Valid entries in `dir`, newest first, stopping after `limit` if given.
    fn collect(&self, key: &EntityKey, limit: Option<usize>) -> Result<Vec<SnapshotEntry>> {
        let dir = self.resolver.history_dir(key)?;
        let mut out = Vec::new();
        for ts in self.list_timestamps(&dir)? {
            let container = dir.join(ts.to_string());
            match self.read_entry(&container, ts) {
                Ok(entry) => {
                    out.push(entry);
                    if limit.is_some_and(|n| out.len() >= n) {
                        break;
                    }
                }
                Err(JapiError::CorruptHistoryEntry { path, reason }) => {
                    tracing::warn!(
                        component = module_path!(),
                        op = "read_history",
                        event = EVENT_CORRUPT_ENTRY,
                        key = %key,
                        timestamp = %ts,
                        path = %path.display(),
                        "skipping corrupt history entry: {}",
                        reason
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Ok(out)
    }

    /// Create a fresh container directory and return its timestamp.
    ///
    /// Starts at `max(now, newest existing + 1)`; `create_dir` fails on an
    /// existing name, in which case the next millisecond is tried.
    fn allocate_container(&self, dir: &Path) -> Result<(Timestamp, PathBuf)> {
        let now = self.clock.now();
        let mut ts = match self.list_timestamps(dir)?.first() {
            Some(newest) if *newest >= now => newest.next(),
            _ => now,
        };

        for _ in 0..MAX_ALLOCATION_ATTEMPTS {
            let container = dir.join(ts.to_string());
            match fs::create_dir(&container) {
                Ok(()) => return Ok((ts, container)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => ts = ts.next(),
                Err(e) => return Err(io_error("create_container", &container, e)),
            }
        }

        Err(storage_error(
            "create_container",
            dir,
            format!(
                "no free timestamp after {} attempts",
                MAX_ALLOCATION_ATTEMPTS
            ),
        ))
    }
}

/// Read one artifact of a container. Any read failure, including a missing
/// file or a directory in its place, marks the container as corrupt.
fn read_artifact(container: &Path, name: &str) -> Result<Vec<u8>> {
    fs::read(container.join(name)).map_err(|e| match e.kind() {
        ErrorKind::NotFound => corrupt_entry(container, format!("missing {}", name)),
        _ => corrupt_entry(container, format!("unreadable {}: {}", name, e)),
    })
}

impl HistoryBackend for FsHistory {
    fn latest(&self, key: &EntityKey) -> Result<Option<SnapshotEntry>> {
        Ok(self.collect(key, Some(1))?.into_iter().next())
    }

    fn entries(&self, key: &EntityKey) -> Result<Vec<SnapshotEntry>> {
        self.collect(key, None)
    }

    fn append(
        &self,
        key: &EntityKey,
        fingerprint: &Fingerprint,
        payload: &[u8],
    ) -> Result<SnapshotEntry> {
        let dir = self.resolver.history_dir(key)?;
        fs::create_dir_all(&dir).map_err(|e| io_error("create_history_dir", &dir, e))?;

        let (timestamp, container) = self.allocate_container(&dir)?;

        // Payload first: a crash in between leaves a container without a
        // fingerprint, which readers skip as corrupt.
        atomic_write(&container.join(PAYLOAD_FILE), payload)?;
        atomic_write(
            &container.join(FINGERPRINT_FILE),
            fingerprint.as_str().as_bytes(),
        )?;

        Ok(SnapshotEntry {
            timestamp,
            fingerprint: fingerprint.clone(),
            payload: payload.to_vec(),
            container,
        })
    }
}
