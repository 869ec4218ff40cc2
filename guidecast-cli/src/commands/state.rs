//! `guidecast state` — operator repairs on the persisted state.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;

use guidecast_core::state;

use crate::commands::resolve_state_path;

#[derive(Subcommand, Debug)]
pub enum StateCommand {
    /// Acknowledge a destination reconfiguration by clearing its fingerprint.
    ResetFingerprint {
        /// Destination key as it appears in the feed.
        destination: String,

        /// State file (defaults to $GUIDECAST_STATE or ~/.guidecast/state.json).
        #[arg(long)]
        state: Option<PathBuf>,
    },

    /// Drop one item's record so the next sync recreates its message.
    Forget {
        /// Item key.
        key: String,

        /// State file (defaults to $GUIDECAST_STATE or ~/.guidecast/state.json).
        #[arg(long)]
        state: Option<PathBuf>,
    },
}

pub fn run(command: StateCommand) -> Result<()> {
    match command {
        StateCommand::ResetFingerprint { destination, state } => {
            let path = resolve_state_path(state)?;
            let mut state = state::load(&path)
                .with_context(|| format!("failed to load state at {}", path.display()))?;
            if state.fingerprints.remove(&destination).is_none() {
                println!("no fingerprint recorded for '{destination}' — nothing to reset");
                return Ok(());
            }
            state::save(&path, &state)?;
            println!(
                "✓ fingerprint for '{destination}' cleared; the next sync records the current webhook"
            );
            Ok(())
        }
        StateCommand::Forget { key, state } => {
            let path = resolve_state_path(state)?;
            let mut state = state::load(&path)
                .with_context(|| format!("failed to load state at {}", path.display()))?;
            if state.items.remove(&key).is_none() {
                println!("no record for '{key}' — nothing to forget");
                return Ok(());
            }
            state::save(&path, &state)?;
            println!(
                "✓ forgot '{key}'; if its remote message still exists, delete it before the \
                 next sync to avoid a duplicate"
            );
            Ok(())
        }
    }
}
