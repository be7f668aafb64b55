//! Project manifest: the single current properties record of a project.
//!
//! Unlike snapshot history the manifest keeps no past versions. On change
//! both files are removed and rewritten, info first, fingerprint last, so a
//! reader that finds a valid `project-md5.txt` also finds the matching info.

use crate::config::StoreConfig;
use crate::errors::{corrupt_entry, io_error, Result};
use crate::fs_util::{atomic_write, ensure_dir, read_optional, remove_if_exists};
use crate::lock::{acquire_if, MANIFEST_LOCK_FILE};
use japi_core::errors::JapiError;
use japi_core::extract::ProjectProperties;
use japi_core::fingerprint::{Fingerprint, FingerprintCodec};
use japi_core::key::PathResolver;
use japi_core_types::schema::{EVENT_MANIFEST_CREATED, EVENT_MANIFEST_REPLACED};
use std::fs;
use std::path::{Path, PathBuf};

pub const PROJECT_INFO_FILE: &str = "project-info.txt";
pub const PROJECT_FINGERPRINT_FILE: &str = "project-md5.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestOutcome {
    Created { fingerprint: Fingerprint },
    Replaced {
        fingerprint: Fingerprint,
        previous: Fingerprint,
    },
    Unchanged { fingerprint: Fingerprint },
}

impl ManifestOutcome {
    pub fn fingerprint(&self) -> &Fingerprint {
        match self {
            Self::Created { fingerprint }
            | Self::Replaced { fingerprint, .. }
            | Self::Unchanged { fingerprint } => fingerprint,
        }
    }
}

/// A manifest read back from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRecord {
    pub properties: ProjectProperties,
    pub fingerprint: Fingerprint,
}

/// Render properties as sorted `key=value` lines.
///
/// # Errors
///
/// `PayloadUnserializable` if a key contains `=` or a line break, or a value
/// contains a line break; such pairs could not be read back unambiguously.
pub fn serialize_properties(properties: &ProjectProperties) -> Result<Vec<u8>> {
    let mut out = String::new();
    for (key, value) in properties {
        if key.contains(['=', '\n', '\r']) {
            return Err(JapiError::PayloadUnserializable {
                message: format!("property key {:?} contains '=' or a line break", key),
            });
        }
        if value.contains(['\n', '\r']) {
            return Err(JapiError::PayloadUnserializable {
                message: format!("value of property {:?} contains a line break", key),
            });
        }
        out.push_str(key);
        out.push('=');
        out.push_str(value);
        out.push('\n');
    }
    Ok(out.into_bytes())
}

/// Inverse of [`serialize_properties`]. Blank lines are skipped; the first
/// `=` on a line separates key from value.
pub fn parse_properties(text: &str) -> Option<ProjectProperties> {
    let mut properties = ProjectProperties::new();
    for line in text.lines().filter(|l| !l.is_empty()) {
        let (key, value) = line.split_once('=')?;
        properties.insert(key.to_string(), value.to_string());
    }
    Some(properties)
}

/// Reads and replaces project manifests under a storage root.
pub struct ProjectManifest {
    resolver: PathResolver,
    codec: FingerprintCodec,
    locking: bool,
}

impl ProjectManifest {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            resolver: PathResolver::new(&config.root),
            codec: FingerprintCodec,
            locking: config.locking,
        }
    }

    /// Make the stored manifest of `project` equal `properties`.
    ///
    /// # Errors
    ///
    /// - `InvalidSegment` for an illegal project name
    /// - `PayloadUnserializable` for properties that cannot be written as lines
    /// - `StorageFailure` on any filesystem failure
    pub fn sync(&self, project: &str, properties: &ProjectProperties) -> Result<ManifestOutcome> {
        let project_dir = self.resolver.project_dir(project)?;
        let bytes = serialize_properties(properties)?;
        let fingerprint = self.codec.fingerprint(&bytes);

        let root = self.resolver.root();
        fs::create_dir_all(root).map_err(|e| io_error("create_root", root, e))?;
        ensure_dir(&project_dir)?;

        let _guard = acquire_if(self.locking, &project_dir.join(MANIFEST_LOCK_FILE))?;

        let (info_path, md5_path) = manifest_paths(&project_dir);
        let previous = match self.read_current(&project_dir) {
            Ok(current) => current.map(|(_, fp)| fp),
            Err(JapiError::CorruptHistoryEntry { path, reason }) => {
                tracing::warn!(
                    component = module_path!(),
                    op = "sync_manifest",
                    project = project,
                    path = %path.display(),
                    "discarding incomplete manifest: {}",
                    reason
                );
                None
            }
            Err(e) => return Err(e),
        };

        if previous.as_ref() == Some(&fingerprint) {
            return Ok(ManifestOutcome::Unchanged { fingerprint });
        }

        remove_if_exists(&md5_path)?;
        remove_if_exists(&info_path)?;
        atomic_write(&info_path, &bytes)?;
        atomic_write(&md5_path, fingerprint.as_str().as_bytes())?;

        match previous {
            None => {
                tracing::info!(
                    component = module_path!(),
                    op = "sync_manifest",
                    event = EVENT_MANIFEST_CREATED,
                    project = project,
                    fingerprint = %fingerprint,
                    "{} manifest created",
                    project
                );
                Ok(ManifestOutcome::Created { fingerprint })
            }
            Some(previous) => {
                tracing::info!(
                    component = module_path!(),
                    op = "sync_manifest",
                    event = EVENT_MANIFEST_REPLACED,
                    project = project,
                    fingerprint = %fingerprint,
                    "{} manifest replaced",
                    project
                );
                Ok(ManifestOutcome::Replaced {
                    fingerprint,
                    previous,
                })
            }
        }
    }

    /// The current manifest, or `None` when absent or incomplete.
    ///
    /// # Errors
    ///
    /// `InvalidSegment` for an illegal project name, `StorageFailure` on I/O
    /// error.
    pub fn load(&self, project: &str) -> Result<Option<ManifestRecord>> {
        let project_dir = self.resolver.project_dir(project)?;
        match self.read_current(&project_dir) {
            Ok(Some((properties, fingerprint))) => Ok(Some(ManifestRecord {
                properties,
                fingerprint,
            })),
            Ok(None) | Err(JapiError::CorruptHistoryEntry { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// `Ok(None)` when no info file exists; `CorruptHistoryEntry` when the
    /// fingerprint is missing, malformed, or disagrees with the info bytes.
    fn read_current(&self, project_dir: &Path) -> Result<Option<(ProjectProperties, Fingerprint)>> {
        let (info_path, md5_path) = manifest_paths(project_dir);
        let Some(info) = read_optional(&info_path)? else {
            return Ok(None);
        };
        let stored = read_optional(&md5_path)?
            .ok_or_else(|| corrupt_entry(&md5_path, "missing manifest fingerprint"))?;
        let fingerprint = std::str::from_utf8(&stored)
            .ok()
            .and_then(Fingerprint::parse)
            .ok_or_else(|| corrupt_entry(&md5_path, "malformed manifest fingerprint"))?;
        if self.codec.fingerprint(&info) != fingerprint {
            return Err(corrupt_entry(
                &info_path,
                "manifest fingerprint does not match info",
            ));
        }
        let properties = std::str::from_utf8(&info)
            .ok()
            .and_then(parse_properties)
            .ok_or_else(|| corrupt_entry(&info_path, "unparseable manifest line"))?;
        Ok(Some((properties, fingerprint)))
    }
}

fn manifest_paths(project_dir: &Path) -> (PathBuf, PathBuf) {
    (
        project_dir.join(PROJECT_INFO_FILE),
        project_dir.join(PROJECT_FINGERPRINT_FILE),
    )
}
