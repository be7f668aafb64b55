//! Store configuration
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults (`root = <home>/.japi-client`, `locking = true`)
//! 2. an optional TOML file
//! 3. `JAPI_*` environment variables (`JAPI_ROOT`, `JAPI_LOCKING`)
//!
//! Callers that already know the root (tests, embedding code) use
//! `StoreConfig::new` and skip the layered loading entirely.

use crate::errors::{config_error, Result};
use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory created under the user's home when no root is configured.
pub const DEFAULT_DIR_NAME: &str = ".japi-client";

/// Prefix of the environment variables read by `StoreConfig::load`.
pub const ENV_PREFIX: &str = "JAPI";

fn default_locking() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Storage root; every project directory lives directly below it.
    pub root: PathBuf,
    /// Take advisory per-key locks around compare-and-append.
    #[serde(default = "default_locking")]
    pub locking: bool,
}

impl StoreConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locking: default_locking(),
        }
    }

    pub fn with_locking(mut self, locking: bool) -> Self {
        self.locking = locking;
        self
    }

    /// `<home>/.japi-client`, or `./.japi-client` when no home is known.
    pub fn default_root() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DIR_NAME)
    }

    /// Load defaults, then `file` (which must exist if given), then env.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the file is missing or malformed, or a value has
    /// the wrong type.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        Self::load_layered(file, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_layered(file: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("root", Self::default_root().to_string_lossy().into_owned())
            .map_err(config_error)?
            .set_default("locking", default_locking())
            .map_err(config_error)?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder
            .add_source(env.try_parsing(true))
            .build()
            .and_then(|c| c.try_deserialize::<StoreConfig>())
            .map_err(config_error)
    }
}
