//! `guidecast status` — persisted state visibility.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use guidecast_core::state::{self, SyncRecord};

use crate::commands::resolve_state_path;

/// Arguments for `guidecast status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// State file (defaults to $GUIDECAST_STATE or ~/.guidecast/state.json).
    #[arg(long)]
    pub state: Option<PathBuf>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct ItemTableRow {
    #[tabled(rename = "item")]
    item: String,
    #[tabled(rename = "remote id")]
    remote_id: String,
    #[tabled(rename = "hash")]
    hash: String,
}

#[derive(Serialize)]
struct StatusJson<'a> {
    state_path: String,
    synced: bool,
    last_sync_at: Option<String>,
    items: &'a BTreeMap<String, SyncRecord>,
    fingerprints: &'a BTreeMap<String, String>,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let path = resolve_state_path(self.state)?;
        let exists = path.exists();
        let state = state::load(&path)
            .with_context(|| format!("failed to load state at {}", path.display()))?;
        let synced = exists && !state.items.is_empty();

        if self.json {
            let payload = StatusJson {
                state_path: path.display().to_string(),
                synced,
                last_sync_at: synced.then(|| state.synced_at.to_rfc3339()),
                items: &state.items,
                fingerprints: &state.fingerprints,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize status")?
            );
            return Ok(());
        }

        let last_sync = if synced {
            format!("{} ago", format_age(state.synced_at))
        } else {
            "never".to_string()
        };
        println!(
            "Guidecast v{} | {} items | {} destinations | last sync {}",
            env!("CARGO_PKG_VERSION"),
            state.items.len(),
            state.fingerprints.len(),
            last_sync,
        );

        if state.items.is_empty() {
            println!("No synced items yet. Run `guidecast sync <feed>` first.");
            return Ok(());
        }

        let rows: Vec<ItemTableRow> = state
            .items
            .iter()
            .map(|(key, record)| ItemTableRow {
                item: key.clone(),
                remote_id: record
                    .remote_id
                    .clone()
                    .unwrap_or_else(|| "—".to_string()),
                hash: hash_prefix(&record.stored_hash),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");

        let pending = state
            .items
            .values()
            .filter(|record| record.remote_id.is_none())
            .count();
        if pending > 0 {
            println!(
                "{} {pending} item(s) have no remote message yet and will be created on the next sync",
                "!".yellow().bold()
            );
        }
        Ok(())
    }
}

fn hash_prefix(hash: &str) -> String {
    hash.chars().take(12).collect()
}

fn format_age(timestamp: DateTime<Utc>) -> String {
    let seconds = Utc::now()
        .signed_duration_since(timestamp)
        .num_seconds()
        .max(0) as u64;
    if seconds < 60 {
        return format!("{seconds}s");
    }
    if seconds < 60 * 60 {
        return format!("{}m", seconds / 60);
    }
    if seconds < 60 * 60 * 24 {
        return format!("{}h", seconds / (60 * 60));
    }
    format!("{}d", seconds / (60 * 60 * 24))
}
