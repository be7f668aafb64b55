//! Subcommands and the store options they share

pub mod history;
pub mod manifest;
pub mod sync;

use clap::Args;
use japi_core::key::EntityKey;
use japi_store::StoreConfig;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct StoreArgs {
    /// Storage root (overrides config file and JAPI_ROOT)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable advisory locking
    #[arg(long, global = true)]
    pub no_lock: bool,
}

impl StoreArgs {
    /// Layered config with command-line overrides applied last.
    pub fn load(&self) -> Result<StoreConfig, Box<dyn std::error::Error>> {
        let mut config = StoreConfig::load(self.config.as_deref())?;
        if let Some(root) = &self.root {
            config.root = root.clone();
        }
        if self.no_lock {
            config.locking = false;
        }
        Ok(config)
    }
}

/// The five segments addressing one entity.
#[derive(Debug, Args)]
pub struct KeyArgs {
    pub project: String,
    pub package: String,
    pub function: String,
    pub action: String,
    pub version: String,
}

impl KeyArgs {
    pub fn to_key(&self) -> EntityKey {
        EntityKey::new(
            &self.project,
            &self.package,
            &self.function,
            &self.action,
            &self.version,
        )
    }
}
