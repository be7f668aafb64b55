//! Extractor reading pre-extracted projects from a JSON file.
//!
//! The file holds an array of projects:
//!
//! ```json
//! [
//!   {
//!     "name": "proj1",
//!     "properties": { "japi.name": "proj1" },
//!     "packages": [
//!       { "name": "pkgA", "functions": [
//!         { "name": "login", "actions": [
//!           { "actionName": "postLogin", "version": "v1",
//!             "payload": { "params": ["user", "bb"] } }
//!         ] }
//!       ] }
//!     ]
//!   }
//! ]
//! ```

use japi_core::errors::{JapiError, Result};
use japi_core::extract::{Extractor, ProjectExtract};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct JsonFileExtractor {
    path: PathBuf,
}

impl JsonFileExtractor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Extractor for JsonFileExtractor {
    fn projects(&self) -> Result<Vec<ProjectExtract>> {
        let bytes = fs::read(&self.path).map_err(|e| JapiError::ExtractionFailed {
            message: format!("cannot read {}: {}", self.path.display(), e),
        })?;
        serde_json::from_slice(&bytes).map_err(|e| JapiError::ExtractionFailed {
            message: format!("cannot parse {}: {}", self.path.display(), e),
        })
    }
}
