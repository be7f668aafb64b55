//! Sync driver.
//!
//! ## Order of work per project
//! 1. Sync the project manifest once
//! 2. For each package -> function -> action (grouped by name) -> version,
//!    record the payload in the snapshot store
//!
//! Every error is logged with its target and captured in the `SyncReport`;
//! processing continues with the next target.

use japi_core::errors::{ExError, JapiError, Result};
use japi_core::extract::{Extractor, ProjectExtract};
use japi_core::fingerprint::CODEC_ID;
use japi_core::key::EntityKey;
use japi_core::{log_op_end, log_op_error, log_op_start};
use japi_core_types::RunId;
use japi_store::{ManifestOutcome, ProjectManifest, RecordOutcome, SnapshotStore};
use std::fmt;
use std::time::Instant;

/// What a failure was about.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncTarget {
    /// The properties manifest of the named project.
    Manifest(String),
    /// One versioned entity.
    Entity(EntityKey),
}

impl fmt::Display for SyncTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncTarget::Manifest(project) => write!(f, "{} (manifest)", project),
            SyncTarget::Entity(key) => write!(f, "{}", key),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncFailure {
    pub target: SyncTarget,
    pub error: JapiError,
}

/// Outcome of syncing one project.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    pub project: String,
    /// `None` when the manifest sync failed.
    pub manifest: Option<ManifestOutcome>,
    pub created: usize,
    pub modified: usize,
    pub unchanged: usize,
    pub failures: Vec<SyncFailure>,
}

impl SyncReport {
    fn new(project: &str) -> Self {
        Self {
            project: project.to_string(),
            ..Self::default()
        }
    }

    /// Number of entity snapshots written (created + modified).
    pub fn written(&self) -> usize {
        self.created + self.modified
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, outcome: &RecordOutcome) {
        match outcome {
            RecordOutcome::Created { .. } => self.created += 1,
            RecordOutcome::Modified { .. } => self.modified += 1,
            RecordOutcome::Unchanged { .. } => self.unchanged += 1,
        }
    }

    fn fail(&mut self, target: SyncTarget, error: JapiError) {
        self.failures.push(SyncFailure { target, error });
    }
}

/// Sync one project's manifest and every entity it contains.
///
/// Never fails as a whole: per-target errors land in `SyncReport::failures`.
pub fn sync_project(
    store: &SnapshotStore,
    manifests: &ProjectManifest,
    project: &ProjectExtract,
) -> SyncReport {
    let name = project.project_name();
    log_op_start!("sync_project", project = name);
    let start = Instant::now();

    let mut report = SyncReport::new(name);

    match manifests.sync(name, &project.properties) {
        Ok(outcome) => report.manifest = Some(outcome),
        Err(e) => {
            log_op_error!(
                "sync_manifest",
                ExError::from(e.clone()),
                start,
                project = name
            );
            report.fail(SyncTarget::Manifest(name.to_string()), e);
        }
    }

    for (key, payload) in project.entries() {
        match store.record_version(&key, payload) {
            Ok(outcome) => report.record(&outcome),
            Err(e) => {
                log_op_error!(
                    "record_version",
                    ExError::from(e.clone()).with_entity_key(key.to_string()),
                    start,
                    project = name,
                    key = %key
                );
                report.fail(SyncTarget::Entity(key), e);
            }
        }
    }

    log_op_end!(
        "sync_project",
        start,
        project = name,
        created = report.created,
        modified = report.modified,
        unchanged = report.unchanged,
        failed = report.failures.len()
    );

    report
}

/// Sync every project the extractor yields, under one `sync_run` span.
///
/// # Errors
///
/// Only extractor failure aborts the run; store errors are reported per
/// target in the returned reports.
pub fn run<E: Extractor + ?Sized>(
    extractor: &E,
    store: &SnapshotStore,
    manifests: &ProjectManifest,
) -> Result<Vec<SyncReport>> {
    let run_id = RunId::new();
    let span = tracing::info_span!("sync_run", run_id = %run_id);
    let _enter = span.enter();

    log_op_start!("sync_run", run_id = %run_id, codec = CODEC_ID);
    let start = Instant::now();

    let projects = extractor.projects().map_err(|e| {
        log_op_error!(
            "sync_run",
            ExError::from(e.clone()),
            start,
            run_id = %run_id
        );
        e
    })?;

    let reports: Vec<SyncReport> = projects
        .iter()
        .map(|project| sync_project(store, manifests, project))
        .collect();

    log_op_end!(
        "sync_run",
        start,
        run_id = %run_id,
        projects = reports.len()
    );

    Ok(reports)
}
