//! japi Store - filesystem persistence for API description snapshots
//!
//! Provides:
//! - `SnapshotStore`: change-detecting, append-only snapshot history per entity key
//! - `FsHistory`: the directory-listing backend behind the `HistoryBackend` seam
//! - `ProjectManifest`: single current project properties record, replaced on change
//! - `StoreConfig`: layered configuration (defaults, file, `JAPI_*` env)
//!
//! On-disk layout:
//!
//! ```text
//! <root>/<project>/project-info.txt
//! <root>/<project>/project-md5.txt
//! <root>/<project>/<package>/<function>/<action>/<version>/date/<timestamp>/info.txt
//! <root>/<project>/<package>/<function>/<action>/<version>/date/<timestamp>/md5.txt
//! ```

pub mod config;
pub mod errors;
mod fs_util;
pub mod history;
pub mod lock;
pub mod manifest;
pub mod store;
pub mod timestamp;

// Re-export key types
pub use crate::config::StoreConfig;
pub use errors::Result;
pub use history::{FsHistory, HistoryBackend, SnapshotEntry};
pub use manifest::{ManifestOutcome, ManifestRecord, ProjectManifest};
pub use store::{RecordOutcome, SnapshotStore};
pub use timestamp::{Clock, Timestamp};
