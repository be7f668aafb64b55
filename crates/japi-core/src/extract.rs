//! Extraction model
//!
//! The records an `Extractor` hands to the sync driver. The store never looks
//! inside `ActionVersion::payload`; it only serializes and fingerprints it.

use crate::errors::Result;
use crate::key::EntityKey;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Property holding the project name when the extractor leaves `name` blank.
pub const PROJECT_NAME_PROPERTY: &str = "japi.name";

/// Project-level properties, kept sorted so serialization is canonical.
pub type ProjectProperties = BTreeMap<String, String>;

/// One version of one action, as produced by the extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionVersion {
    pub action_name: String,
    pub version: String,
    pub payload: Value,
}

/// A function (controller) and every action version it exposes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FunctionExtract {
    pub name: String,
    #[serde(default)]
    pub actions: Vec<ActionVersion>,
}

impl FunctionExtract {
    /// Versions grouped by action name, in name order.
    ///
    /// Within one action, versions keep the order the extractor produced.
    pub fn actions_by_name(&self) -> BTreeMap<&str, Vec<&ActionVersion>> {
        let mut grouped: BTreeMap<&str, Vec<&ActionVersion>> = BTreeMap::new();
        for action in &self.actions {
            grouped
                .entry(action.action_name.as_str())
                .or_default()
                .push(action);
        }
        grouped
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PackageExtract {
    pub name: String,
    #[serde(default)]
    pub functions: Vec<FunctionExtract>,
}

/// Everything extracted for one project.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectExtract {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub properties: ProjectProperties,
    #[serde(default)]
    pub packages: Vec<PackageExtract>,
}

impl ProjectExtract {
    /// The explicit name, or the `japi.name` property when the name is blank.
    pub fn project_name(&self) -> &str {
        if self.name.trim().is_empty() {
            self.properties
                .get(PROJECT_NAME_PROPERTY)
                .map(String::as_str)
                .unwrap_or(self.name.as_str())
        } else {
            &self.name
        }
    }

    /// Every `(key, payload)` pair in traversal order:
    /// packages -> functions -> actions (by name) -> versions.
    pub fn entries(&self) -> Vec<(EntityKey, &Value)> {
        let project = self.project_name();
        let mut out = Vec::new();
        for package in &self.packages {
            for function in &package.functions {
                for (action_name, versions) in function.actions_by_name() {
                    for v in versions {
                        let key = EntityKey::new(
                            project,
                            &package.name,
                            &function.name,
                            action_name,
                            &v.version,
                        );
                        out.push((key, &v.payload));
                    }
                }
            }
        }
        out
    }
}

/// Source of extracted API descriptions.
pub trait Extractor {
    /// All projects known to this extractor.
    ///
    /// # Errors
    ///
    /// `ExtractionFailed` when the source cannot be read.
    fn projects(&self) -> Result<Vec<ProjectExtract>>;
}
