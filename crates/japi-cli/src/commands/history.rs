//! History and show commands

use super::{KeyArgs, StoreArgs};
use clap::Args;
use japi_store::{SnapshotEntry, SnapshotStore, Timestamp};

#[derive(Debug, Args)]
pub struct HistoryArgs {
    #[command(flatten)]
    pub key: KeyArgs,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    #[command(flatten)]
    pub key: KeyArgs,

    /// Container timestamp (13-digit milliseconds); newest when omitted
    #[arg(long)]
    pub at: Option<u64>,
}

pub fn execute_history(
    store_args: &StoreArgs,
    args: HistoryArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = SnapshotStore::open(store_args.load()?);
    let key = args.key.to_key();

    let entries = store.history(&key)?;
    if entries.is_empty() {
        println!("No snapshots for {}", key);
        return Ok(());
    }
    for entry in &entries {
        println!("{}", describe(entry));
    }
    Ok(())
}

pub fn execute_show(
    store_args: &StoreArgs,
    args: ShowArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = SnapshotStore::open(store_args.load()?);
    let key = args.key.to_key();

    let entry = match args.at {
        Some(ms) => {
            let wanted = Timestamp::from_millis(ms);
            store
                .history(&key)?
                .into_iter()
                .find(|e| e.timestamp == wanted)
        }
        None => store.latest(&key)?,
    };

    let entry = entry.ok_or_else(|| format!("No matching snapshot for {}", key))?;
    println!("{}", serde_json::to_string_pretty(&entry.payload_json()?)?);
    Ok(())
}

fn describe(entry: &SnapshotEntry) -> String {
    match entry.timestamp.to_datetime() {
        Some(at) => format!(
            "{}  {}  {}",
            entry.timestamp,
            at.format("%Y-%m-%d %H:%M:%S%.3f UTC"),
            entry.fingerprint
        ),
        None => format!("{}  {}", entry.timestamp, entry.fingerprint),
    }
}
