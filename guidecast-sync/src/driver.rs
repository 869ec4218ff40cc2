//! Batch driver — sequences destinations and items, aggregates failures,
//! and persists state incrementally.
//!
//! One bad item never aborts the batch; a destination whose fingerprint
//! check fails is halted for the remainder of the run while other
//! destinations continue. State is saved after every successful mutation so
//! a killed process loses at most the in-flight item.

use std::path::Path;

use chrono::Utc;
use serde::Serialize;

use guidecast_core::state;
use guidecast_core::types::{DestinationKey, ItemKey};

use crate::endpoint::MessageEndpoint;
use crate::error::SyncError;
use crate::gate;
use crate::item::DestinationBatch;
use crate::upsert::{upsert_item, SyncOptions, UpsertOutcome};

/// Transition taken for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemOutcome {
    pub destination: DestinationKey,
    pub key: ItemKey,
    pub outcome: UpsertOutcome,
}

/// A per-item failure that did not abort the batch.
#[derive(Debug, Clone, Serialize)]
pub struct ItemFailure {
    pub destination: DestinationKey,
    pub key: ItemKey,
    pub error: String,
}

/// A destination halted for the rest of the run.
#[derive(Debug, Clone, Serialize)]
pub struct HaltedDestination {
    pub destination: DestinationKey,
    pub error: String,
}

/// Aggregate result of one batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub created: usize,
    pub edited: usize,
    pub replaced: usize,
    pub skipped: usize,
    pub outcomes: Vec<ItemOutcome>,
    pub failures: Vec<ItemFailure>,
    pub halted: Vec<HaltedDestination>,
}

impl RunSummary {
    /// True when every item synced and no destination was halted.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.halted.is_empty()
    }

    fn tally(&mut self, outcome: &UpsertOutcome) {
        match outcome {
            UpsertOutcome::Unchanged => self.skipped += 1,
            UpsertOutcome::Created { .. } | UpsertOutcome::WouldCreate => self.created += 1,
            UpsertOutcome::Edited | UpsertOutcome::WouldEdit => self.edited += 1,
            UpsertOutcome::Replaced { .. } | UpsertOutcome::WouldReplace => self.replaced += 1,
        }
    }
}

/// Run every destination batch against the endpoint, persisting state at
/// `state_path`.
pub fn run_batch<E: MessageEndpoint>(
    endpoint: &E,
    state_path: &Path,
    batches: &[DestinationBatch],
    options: SyncOptions,
) -> Result<RunSummary, SyncError> {
    let run_started_at = Utc::now();
    let mut state = state::load(state_path)?;
    let mut summary = RunSummary::default();

    for batch in batches {
        if let Err(err) = gate::verify_destination(&mut state, &batch.key, &batch.webhook) {
            tracing::error!("destination {} halted: {err}", batch.key);
            summary.halted.push(HaltedDestination {
                destination: batch.key.clone(),
                error: err.to_string(),
            });
            continue;
        }

        for item in &batch.items {
            match upsert_item(endpoint, &batch.webhook, item, &mut state, options) {
                Ok(outcome) => {
                    summary.tally(&outcome);
                    if outcome.is_mutation() {
                        state::save(state_path, &state)?;
                    }
                    summary.outcomes.push(ItemOutcome {
                        destination: batch.key.clone(),
                        key: item.key.clone(),
                        outcome,
                    });
                }
                Err(err) => {
                    tracing::error!("item {} failed: {err}", item.key);
                    summary.failures.push(ItemFailure {
                        destination: batch.key.clone(),
                        key: item.key.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }
    }

    if !options.dry_run {
        state.synced_at = run_started_at;
        state::save(state_path, &state)?;
    }
    Ok(summary)
}
