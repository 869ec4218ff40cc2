//! Guidecast — mirror externally produced guide content into chat channel
//! webhooks.
//!
//! # Usage
//!
//! ```text
//! guidecast sync <feed.json> [--state <path>] [--dry-run] [--strict] [--strategy edit|replace] [--json]
//! guidecast status [--state <path>] [--json]
//! guidecast state reset-fingerprint <destination> [--state <path>]
//! guidecast state forget <item-key> [--state <path>]
//! ```
//!
//! The feed document is produced by the scraper/translator side; webhook
//! URLs are taken from the environment variables the feed names, never from
//! the feed itself.

mod commands;
mod feed;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{state::StateCommand, status::StatusArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "guidecast",
    version,
    about = "Sync scraped guide content into chat channel webhooks",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a batch sync from a feed document.
    Sync(SyncArgs),

    /// Show the persisted sync state.
    Status(StatusArgs),

    /// Inspect and repair persisted state entries.
    State {
        #[command(subcommand)]
        command: StateCommand,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Sync(args) => args.run(),
        Commands::Status(args) => args.run(),
        Commands::State { command } => commands::state::run(command),
    }
}
