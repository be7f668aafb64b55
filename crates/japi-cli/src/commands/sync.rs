//! Sync command

use super::StoreArgs;
use clap::Args;
use japi_engine::{run, JsonFileExtractor};
use japi_store::{ProjectManifest, SnapshotStore};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// JSON file holding an array of extracted projects
    #[arg(long)]
    pub input: PathBuf,
}

pub fn execute(store_args: &StoreArgs, args: SyncArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = store_args.load()?;
    let manifests = ProjectManifest::new(&config);
    let store = SnapshotStore::open(config);

    let reports = run(&JsonFileExtractor::new(&args.input), &store, &manifests)?;

    let mut failed = 0;
    for report in &reports {
        println!(
            "{}: {} created, {} modified, {} unchanged, {} failed",
            report.project,
            report.created,
            report.modified,
            report.unchanged,
            report.failures.len()
        );
        for failure in &report.failures {
            println!("  {}: {}", failure.target, failure.error);
        }
        failed += report.failures.len();
    }

    if failed > 0 {
        return Err(format!("{} target(s) failed", failed).into());
    }
    Ok(())
}
