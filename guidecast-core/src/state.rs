//! Persisted sync state — remote message ids and content hashes per item.
//!
//! Persists a `SyncState` JSON document at a caller-chosen path. A missing
//! file loads as an empty state (first run is not an error). Writes use the
//! atomic `.tmp` + rename pattern so an interrupted save never corrupts the
//! previous state.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{io_err, StateError};

/// Persisted record for one item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncRecord {
    /// Identifier returned by the endpoint when the message was created;
    /// `None` means the message was never successfully created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
    /// The content hash in effect when `remote_id` was last valid.
    pub stored_hash: String,
}

/// On-disk sync state document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncState {
    pub synced_at: DateTime<Utc>,
    /// Item key → last synced record.
    #[serde(default)]
    pub items: BTreeMap<String, SyncRecord>,
    /// Destination key → digest of its connection secret.
    #[serde(default)]
    pub fingerprints: BTreeMap<String, String>,
}

impl SyncState {
    /// Fresh empty state.
    pub fn new() -> Self {
        SyncState {
            synced_at: Utc::now(),
            items: BTreeMap::new(),
            fingerprints: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&SyncRecord> {
        self.items.get(key)
    }

    pub fn put(&mut self, key: impl Into<String>, record: SyncRecord) {
        self.items.insert(key.into(), record);
    }
}

impl Default for SyncState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StateCompat {
    Structured(StateStructuredCompat),
    Legacy(LegacyState),
}

#[derive(Debug, Deserialize)]
struct StateStructuredCompat {
    synced_at: Option<DateTime<Utc>>,
    items: BTreeMap<String, SyncRecord>,
    #[serde(default)]
    fingerprints: BTreeMap<String, String>,
}

/// Shape written by the first generation of the sync job:
/// `{"messages": {key: {"message_id": …, "hash": …}}}`.
#[derive(Debug, Deserialize)]
struct LegacyState {
    messages: BTreeMap<String, LegacyRecord>,
}

#[derive(Debug, Deserialize)]
struct LegacyRecord {
    #[serde(default)]
    message_id: Option<String>,
    #[serde(default)]
    hash: Option<String>,
}

/// Load the sync state at `path`.
///
/// Returns an empty state if the file does not yet exist.
pub fn load(path: &Path) -> Result<SyncState, StateError> {
    if !path.exists() {
        return Ok(SyncState::new());
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    match serde_json::from_str::<StateCompat>(&contents)? {
        StateCompat::Structured(state) => Ok(SyncState {
            synced_at: state.synced_at.unwrap_or_else(Utc::now),
            items: state.items,
            fingerprints: state.fingerprints,
        }),
        StateCompat::Legacy(legacy) => Ok(SyncState {
            synced_at: Utc::now(),
            items: legacy
                .messages
                .into_iter()
                .map(|(key, record)| {
                    (
                        key,
                        SyncRecord {
                            remote_id: record.message_id.filter(|id| !id.is_empty()),
                            stored_hash: record.hash.unwrap_or_default(),
                        },
                    )
                })
                .collect(),
            fingerprints: BTreeMap::new(),
        }),
    }
}

/// Save the sync state to `path` atomically.
///
/// Writes to `<path>.tmp` then renames to `<path>`.
pub fn save(path: &Path, state: &SyncState) -> Result<(), StateError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
        }
    }

    let json = serde_json::to_string_pretty(state)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}
