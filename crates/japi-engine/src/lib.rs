//! japi Engine - sync orchestration
//!
//! Walks extractor output and feeds every entity through the snapshot store
//! and every project's properties through its manifest. Failures are
//! collected per entity; one bad key never stops the rest of a run.

pub mod json_file;
pub mod sync;

pub use json_file::JsonFileExtractor;
pub use sync::{run, sync_project, SyncFailure, SyncReport, SyncTarget};
