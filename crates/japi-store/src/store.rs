//! Change-detecting snapshot store.
//!
//! `record_version` writes a new snapshot only when the payload's fingerprint
//! differs from the newest valid entry for the key. Unchanged payloads leave
//! the filesystem untouched apart from directories that must already exist.

use crate::config::StoreConfig;
use crate::errors::{io_error, Result};
use crate::fs_util::ensure_dir;
use crate::history::{FsHistory, HistoryBackend, SnapshotEntry};
use crate::lock::{acquire_if, HISTORY_LOCK_FILE};
use crate::timestamp::{Clock, SystemClock, Timestamp};
use japi_core::fingerprint::{Fingerprint, FingerprintCodec};
use japi_core::key::{Depth, EntityKey, PathResolver, HISTORY_DIR};
use japi_core_types::schema::{EVENT_FIRST_CREATED, EVENT_MODIFIED};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// What `record_version` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// First snapshot for the key.
    Created {
        timestamp: Timestamp,
        fingerprint: Fingerprint,
    },
    /// Payload differed from the newest snapshot; a new one was appended.
    Modified {
        timestamp: Timestamp,
        fingerprint: Fingerprint,
        previous: Fingerprint,
    },
    /// Payload matched the newest snapshot; nothing was written.
    Unchanged {
        timestamp: Timestamp,
        fingerprint: Fingerprint,
    },
}

impl RecordOutcome {
    /// Timestamp of the entry that now represents the key.
    pub fn timestamp(&self) -> Timestamp {
        match self {
            Self::Created { timestamp, .. }
            | Self::Modified { timestamp, .. }
            | Self::Unchanged { timestamp, .. } => *timestamp,
        }
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        match self {
            Self::Created { fingerprint, .. }
            | Self::Modified { fingerprint, .. }
            | Self::Unchanged { fingerprint, .. } => fingerprint,
        }
    }

    /// Whether a new entry was written.
    pub fn is_write(&self) -> bool {
        !matches!(self, Self::Unchanged { .. })
    }
}

pub struct SnapshotStore {
    config: StoreConfig,
    resolver: PathResolver,
    codec: FingerprintCodec,
    history: Box<dyn HistoryBackend>,
}

impl SnapshotStore {
    /// Filesystem store using the system clock.
    pub fn open(config: StoreConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Filesystem store with an injected clock.
    pub fn with_clock(config: StoreConfig, clock: Arc<dyn Clock>) -> Self {
        let resolver = PathResolver::new(&config.root);
        let history = FsHistory::new(resolver.clone(), clock);
        Self::with_history(config, Box::new(history))
    }

    /// Store backed by a custom history implementation.
    pub fn with_history(config: StoreConfig, history: Box<dyn HistoryBackend>) -> Self {
        Self {
            resolver: PathResolver::new(&config.root),
            codec: FingerprintCodec,
            config,
            history,
        }
    }

    pub fn root(&self) -> &Path {
        self.resolver.root()
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Record `payload` under `key` if it differs from the newest snapshot.
    ///
    /// The key is validated and the payload serialized before anything is
    /// created on disk.
    ///
    /// # Errors
    ///
    /// - `InvalidSegment` for an illegal key segment
    /// - `PayloadUnserializable` if the payload cannot be serialized
    /// - `StorageFailure` on any filesystem failure
    pub fn record_version<T: Serialize + ?Sized>(
        &self,
        key: &EntityKey,
        payload: &T,
    ) -> Result<RecordOutcome> {
        let version_dir = self.resolver.resolve(key, Depth::Version)?;
        let (bytes, fingerprint) = self.codec.encode(payload)?;

        self.ensure_key_dirs(key)?;

        let _guard = acquire_if(self.config.locking, &version_dir.join(HISTORY_LOCK_FILE))?;

        let previous = self.history.latest(key)?;
        if let Some(prev) = &previous {
            if prev.fingerprint == fingerprint {
                return Ok(RecordOutcome::Unchanged {
                    timestamp: prev.timestamp,
                    fingerprint,
                });
            }
        }

        let entry = self.history.append(key, &fingerprint, &bytes)?;

        match previous {
            None => {
                tracing::info!(
                    component = module_path!(),
                    op = "record_version",
                    event = EVENT_FIRST_CREATED,
                    key = %key,
                    timestamp = %entry.timestamp,
                    fingerprint = %entry.fingerprint,
                    "{} first created",
                    key
                );
                Ok(RecordOutcome::Created {
                    timestamp: entry.timestamp,
                    fingerprint,
                })
            }
            Some(prev) => {
                tracing::info!(
                    component = module_path!(),
                    op = "record_version",
                    event = EVENT_MODIFIED,
                    key = %key,
                    timestamp = %entry.timestamp,
                    fingerprint = %entry.fingerprint,
                    "{} modified",
                    key
                );
                Ok(RecordOutcome::Modified {
                    timestamp: entry.timestamp,
                    fingerprint,
                    previous: prev.fingerprint,
                })
            }
        }
    }

    /// Newest valid snapshot for `key`.
    ///
    /// # Errors
    ///
    /// `InvalidSegment` for an illegal key, `StorageFailure` on I/O error.
    pub fn latest(&self, key: &EntityKey) -> Result<Option<SnapshotEntry>> {
        self.history.latest(key)
    }

    /// All valid snapshots for `key`, newest first.
    ///
    /// # Errors
    ///
    /// `InvalidSegment` for an illegal key, `StorageFailure` on I/O error.
    pub fn history(&self, key: &EntityKey) -> Result<Vec<SnapshotEntry>> {
        self.history.entries(key)
    }

    /// Create root, every key level and `date/`, one level at a time.
    fn ensure_key_dirs(&self, key: &EntityKey) -> Result<()> {
        let root = self.resolver.root();
        fs::create_dir_all(root).map_err(|e| io_error("create_root", root, e))?;

        let mut dir = root.to_path_buf();
        for depth in Depth::ALL {
            dir.push(key.segment(depth));
            ensure_dir(&dir)?;
        }
        ensure_dir(&dir.join(HISTORY_DIR))
    }
}
