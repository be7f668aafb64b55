//! Entity addressing
//!
//! An `EntityKey` names one versioned action:
//! `(project, package, function, action, version)`. The `PathResolver` maps a
//! key, truncated to a `Depth`, onto a directory under the storage root:
//!
//! ```text
//! <root>/<project>/<package>/<function>/<action>/<version>
//! ```
//!
//! Resolution is pure. Each level validates its own segment and then
//! delegates to the level one shallower, so a successful resolve at depth N
//! implies every shallower segment was validated too.

use crate::errors::{JapiError, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// Name of the directory holding the timestamp containers of one key.
pub const HISTORY_DIR: &str = "date";

/// Depth in the entity hierarchy, 1 = project .. 5 = version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Depth {
    Project = 1,
    Package = 2,
    Function = 3,
    Action = 4,
    Version = 5,
}

impl Depth {
    /// All depths, shallowest first.
    pub const ALL: [Depth; 5] = [
        Depth::Project,
        Depth::Package,
        Depth::Function,
        Depth::Action,
        Depth::Version,
    ];

    /// The next shallower depth, `None` for `Project`.
    pub fn parent(self) -> Option<Depth> {
        match self {
            Depth::Project => None,
            Depth::Package => Some(Depth::Project),
            Depth::Function => Some(Depth::Package),
            Depth::Action => Some(Depth::Function),
            Depth::Version => Some(Depth::Action),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Depth::Project => "project",
            Depth::Package => "package",
            Depth::Function => "function",
            Depth::Action => "action",
            Depth::Version => "version",
        }
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Hierarchical address of one versioned API element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityKey {
    project: String,
    package: String,
    function: String,
    action: String,
    version: String,
}

impl EntityKey {
    pub fn new(
        project: impl Into<String>,
        package: impl Into<String>,
        function: impl Into<String>,
        action: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            package: package.into(),
            function: function.into(),
            action: action.into(),
            version: version.into(),
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// The segment at the given depth.
    pub fn segment(&self, depth: Depth) -> &str {
        match depth {
            Depth::Project => &self.project,
            Depth::Package => &self.package,
            Depth::Function => &self.function,
            Depth::Action => &self.action,
            Depth::Version => &self.version,
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}",
            self.project, self.package, self.function, self.action, self.version
        )
    }
}

/// Check a single path segment.
///
/// Rejects blank segments, segments containing `/` or `\` (on every
/// platform), and the relative components `.` and `..`.
pub fn validate_segment(level: Depth, segment: &str) -> Result<()> {
    let reason = if segment.trim().is_empty() {
        Some("must not be blank")
    } else if segment.contains(['/', '\\']) || segment.chars().any(std::path::is_separator) {
        Some("must not contain a path separator")
    } else if segment == "." || segment == ".." {
        Some("must not be a relative path component")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(JapiError::InvalidSegment {
            level,
            segment: segment.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Maps entity keys to canonical directories under a storage root.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for `key` truncated to `depth` segments.
    ///
    /// # Errors
    ///
    /// `InvalidSegment` if any segment up to `depth` is illegal.
    pub fn resolve(&self, key: &EntityKey, depth: Depth) -> Result<PathBuf> {
        let segment = key.segment(depth);
        validate_segment(depth, segment)?;
        let parent = match depth.parent() {
            Some(shallower) => self.resolve(key, shallower)?,
            None => self.root.clone(),
        };
        Ok(parent.join(segment))
    }

    /// Directory of a project, without needing a full key.
    ///
    /// # Errors
    ///
    /// `InvalidSegment` if the project name is illegal.
    pub fn project_dir(&self, project: &str) -> Result<PathBuf> {
        validate_segment(Depth::Project, project)?;
        Ok(self.root.join(project))
    }

    /// `<version>/date`: the directory holding the key's snapshot containers.
    ///
    /// # Errors
    ///
    /// `InvalidSegment` if any segment of the key is illegal.
    pub fn history_dir(&self, key: &EntityKey) -> Result<PathBuf> {
        Ok(self.resolve(key, Depth::Version)?.join(HISTORY_DIR))
    }
}
