//! japi CLI
//!
//! Command-line interface for the API description snapshot store

use clap::{Parser, Subcommand};
use japi_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "japi")]
#[command(about = "japi - versioned snapshots of API descriptions", long_about = None)]
struct Cli {
    #[command(flatten)]
    store: commands::StoreArgs,

    /// Emit JSON logs instead of human-readable ones
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Record every project of an extraction file
    Sync(commands::sync::SyncArgs),
    /// List the snapshots of one entity, newest first
    History(commands::history::HistoryArgs),
    /// Print a stored payload
    Show(commands::history::ShowArgs),
    /// Print a project's current manifest
    Manifest(commands::manifest::ManifestArgs),
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init(if cli.json_logs {
        Profile::Production
    } else {
        Profile::Development
    });

    let result = match cli.command {
        Commands::Sync(args) => commands::sync::execute(&cli.store, args),
        Commands::History(args) => commands::history::execute_history(&cli.store, args),
        Commands::Show(args) => commands::history::execute_show(&cli.store, args),
        Commands::Manifest(args) => commands::manifest::execute(&cli.store, args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
