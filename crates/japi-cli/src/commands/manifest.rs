//! Manifest command

use super::StoreArgs;
use clap::Args;
use japi_store::ProjectManifest;

#[derive(Debug, Args)]
pub struct ManifestArgs {
    pub project: String,
}

pub fn execute(store_args: &StoreArgs, args: ManifestArgs) -> Result<(), Box<dyn std::error::Error>> {
    let manifests = ProjectManifest::new(&store_args.load()?);

    match manifests.load(&args.project)? {
        Some(record) => {
            println!("fingerprint: {}", record.fingerprint);
            for (key, value) in &record.properties {
                println!("{}={}", key, value);
            }
        }
        None => println!("No manifest for {}", args.project),
    }
    Ok(())
}
