//! `guidecast sync` — run a batch sync from a feed document.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;

use guidecast_sync::{
    run_batch, RecoveryMode, RunSummary, SyncOptions, UpdateStrategy, UpsertOutcome,
};
use guidecast_transport::client::WebhookClient;

use crate::commands::resolve_state_path;
use crate::feed;

/// Arguments for `guidecast sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Path to the feed document produced by the scraper.
    pub feed: PathBuf,

    /// State file (defaults to $GUIDECAST_STATE or ~/.guidecast/state.json).
    #[arg(long)]
    pub state: Option<PathBuf>,

    /// Report what would change without touching the endpoint or the state.
    #[arg(long)]
    pub dry_run: bool,

    /// Treat a vanished remote message as an error instead of recreating it.
    #[arg(long)]
    pub strict: bool,

    /// Force the mutation strategy (default: edit in place, or replace when
    /// the item carries attachments).
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Emit the run summary as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Thin wrapper so clap can parse the strategy from CLI args.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum StrategyArg {
    Edit,
    Replace,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let state_path = resolve_state_path(self.state.clone())?;
        let feed = feed::load(&self.feed)?;
        let feed_dir = self.feed.parent().unwrap_or(Path::new("."));
        let (batches, skipped_destinations) = feed::into_batches(feed, feed_dir)?;

        let options = SyncOptions {
            recovery: if self.strict {
                RecoveryMode::Strict
            } else {
                RecoveryMode::Recreate
            },
            strategy: match self.strategy {
                Some(StrategyArg::Edit) => UpdateStrategy::Edit,
                Some(StrategyArg::Replace) => UpdateStrategy::Replace,
                None => UpdateStrategy::Auto,
            },
            dry_run: self.dry_run,
        };

        let client = WebhookClient::new();
        let summary =
            run_batch(&client, &state_path, &batches, options).context("batch run failed")?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            print_summary(&summary, &skipped_destinations, self.dry_run);
        }

        if !summary.is_clean() {
            bail!(
                "{} item(s) failed, {} destination(s) halted",
                summary.failures.len(),
                summary.halted.len()
            );
        }
        Ok(())
    }
}

fn print_summary(summary: &RunSummary, skipped_destinations: &[String], dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };

    for entry in &summary.outcomes {
        let (glyph, label) = outcome_glyph(&entry.outcome);
        println!("  {glyph}  {}/{} — {label}", entry.destination, entry.key);
    }
    for failure in &summary.failures {
        println!(
            "  {}  {}/{} — {}",
            "✗".red().bold(),
            failure.destination,
            failure.key,
            failure.error
        );
    }

    println!(
        "{prefix}✓ {} created, {} edited, {} replaced, {} unchanged, {} failed",
        summary.created,
        summary.edited,
        summary.replaced,
        summary.skipped,
        summary.failures.len(),
    );

    for destination in skipped_destinations {
        println!("  ·  '{destination}' skipped (webhook variable unset)");
    }
    for halted in &summary.halted {
        println!(
            "{} destination '{}' halted: {}",
            "!".yellow().bold(),
            halted.destination,
            halted.error
        );
        println!(
            "  run `guidecast state reset-fingerprint {}` once the new webhook is intentional",
            halted.destination
        );
    }
}

fn outcome_glyph(outcome: &UpsertOutcome) -> (String, &'static str) {
    match outcome {
        UpsertOutcome::Unchanged => ("·".bright_black().to_string(), "unchanged"),
        UpsertOutcome::Created { .. } => ("✚".green().to_string(), "created"),
        UpsertOutcome::Edited => ("✎".green().to_string(), "edited"),
        UpsertOutcome::Replaced { .. } => ("↻".green().to_string(), "replaced"),
        UpsertOutcome::WouldCreate => ("~".yellow().to_string(), "would create"),
        UpsertOutcome::WouldEdit => ("~".yellow().to_string(), "would edit"),
        UpsertOutcome::WouldReplace => ("~".yellow().to_string(), "would replace"),
    }
}
