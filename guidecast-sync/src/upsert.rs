//! Per-item upsert state machine.
//!
//! Hash comparison is the sole gate: an unchanged hash with a known remote
//! id makes no network call; a changed hash triggers exactly one mutation
//! (edit or replace), never two. Records are only mutated after the endpoint
//! confirms the operation.

use serde::Serialize;

use guidecast_core::state::{SyncRecord, SyncState};
use guidecast_transport::client::EditOutcome;
use guidecast_transport::webhook::Webhook;

use crate::endpoint::MessageEndpoint;
use crate::error::SyncError;
use crate::item::Item;

/// Policy when an edit target has been deleted out-of-band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecoveryMode {
    /// Recreate the message and adopt the new id.
    #[default]
    Recreate,
    /// Refuse: an operator removed the message on purpose and must clear
    /// the item's record before the next sync may recreate it.
    Strict,
}

/// How a changed item is pushed to the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateStrategy {
    /// Edit in place, or replace when the item carries attachments (the
    /// edit call cannot change attachments).
    #[default]
    Auto,
    /// Always edit in place.
    Edit,
    /// Always create the new message first, then delete the old one.
    Replace,
}

/// Orchestrator switches for one run.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    pub recovery: RecoveryMode,
    pub strategy: UpdateStrategy,
    /// Report transitions without any network call or state mutation.
    pub dry_run: bool,
}

/// Outcome of one item's transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    /// Hash unchanged and remote id known; nothing to do.
    Unchanged,
    Created { remote_id: String },
    Edited,
    /// A new message was created and the old one deleted.
    Replaced { remote_id: String },
    /// Dry-run counterparts of the three mutations.
    WouldCreate,
    WouldEdit,
    WouldReplace,
}

impl UpsertOutcome {
    /// True for outcomes that changed the endpoint (and therefore the state).
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            UpsertOutcome::Created { .. } | UpsertOutcome::Edited | UpsertOutcome::Replaced { .. }
        )
    }
}

/// Run one item through the state machine.
pub fn upsert_item<E: MessageEndpoint>(
    endpoint: &E,
    webhook: &Webhook,
    item: &Item,
    state: &mut SyncState,
    options: SyncOptions,
) -> Result<UpsertOutcome, SyncError> {
    let previous = state.get(item.key.as_str());
    let existing_id = previous.and_then(|record| record.remote_id.clone());

    if let Some(record) = previous {
        if existing_id.is_some() && record.stored_hash == item.content_hash {
            tracing::debug!("unchanged: {}", item.key);
            return Ok(UpsertOutcome::Unchanged);
        }
    }

    let Some(old_id) = existing_id else {
        // Never created (or a previous create failed before an id was known).
        if options.dry_run {
            return Ok(UpsertOutcome::WouldCreate);
        }
        let remote_id = endpoint.create(webhook, &item.payload, &item.files)?;
        state.put(
            item.key.as_str(),
            SyncRecord {
                remote_id: Some(remote_id.clone()),
                stored_hash: item.content_hash.clone(),
            },
        );
        tracing::info!("created: {} -> {remote_id}", item.key);
        return Ok(UpsertOutcome::Created { remote_id });
    };

    match effective_strategy(options.strategy, item) {
        UpdateStrategy::Replace => {
            if options.dry_run {
                return Ok(UpsertOutcome::WouldReplace);
            }
            replace(endpoint, webhook, item, &old_id, state)
        }
        _ => {
            if options.dry_run {
                return Ok(UpsertOutcome::WouldEdit);
            }
            edit(endpoint, webhook, item, &old_id, state, options)
        }
    }
}

fn effective_strategy(strategy: UpdateStrategy, item: &Item) -> UpdateStrategy {
    match strategy {
        UpdateStrategy::Auto if item.files.is_empty() => UpdateStrategy::Edit,
        UpdateStrategy::Auto => UpdateStrategy::Replace,
        forced => forced,
    }
}

fn edit<E: MessageEndpoint>(
    endpoint: &E,
    webhook: &Webhook,
    item: &Item,
    old_id: &str,
    state: &mut SyncState,
    options: SyncOptions,
) -> Result<UpsertOutcome, SyncError> {
    match endpoint.update(webhook, old_id, &item.payload)? {
        EditOutcome::Edited => {
            state.put(
                item.key.as_str(),
                SyncRecord {
                    remote_id: Some(old_id.to_string()),
                    stored_hash: item.content_hash.clone(),
                },
            );
            tracing::info!("edited: {} ({old_id})", item.key);
            Ok(UpsertOutcome::Edited)
        }
        EditOutcome::Gone => match options.recovery {
            RecoveryMode::Strict => Err(SyncError::RemoteMessageMissing {
                key: item.key.clone(),
                remote_id: old_id.to_string(),
            }),
            RecoveryMode::Recreate => {
                tracing::warn!(
                    "message {old_id} for {} vanished from the endpoint; recreating",
                    item.key
                );
                let remote_id = endpoint.create(webhook, &item.payload, &item.files)?;
                state.put(
                    item.key.as_str(),
                    SyncRecord {
                        remote_id: Some(remote_id.clone()),
                        stored_hash: item.content_hash.clone(),
                    },
                );
                Ok(UpsertOutcome::Created { remote_id })
            }
        },
    }
}

fn replace<E: MessageEndpoint>(
    endpoint: &E,
    webhook: &Webhook,
    item: &Item,
    old_id: &str,
    state: &mut SyncState,
) -> Result<UpsertOutcome, SyncError> {
    // Create first: a crash between the two calls can only leave an extra
    // message, never none.
    let remote_id = endpoint.create(webhook, &item.payload, &item.files)?;
    state.put(
        item.key.as_str(),
        SyncRecord {
            remote_id: Some(remote_id.clone()),
            stored_hash: item.content_hash.clone(),
        },
    );

    // Best-effort removal of the superseded message; the delete itself
    // already tolerates an id that is gone.
    if let Err(err) = endpoint.delete(webhook, old_id) {
        tracing::warn!(
            "stale message {old_id} for {} could not be deleted: {err}",
            item.key
        );
    }
    tracing::info!("replaced: {} ({old_id} -> {remote_id})", item.key);
    Ok(UpsertOutcome::Replaced { remote_id })
}
