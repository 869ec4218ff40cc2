//! Error types for guidecast-sync.

use thiserror::Error;

use guidecast_core::error::StateError;
use guidecast_core::types::{DestinationKey, ItemKey};
use guidecast_transport::error::TransportError;

/// All errors that can arise from sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An error from the webhook transport.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// An error from the state store.
    #[error("state error: {0}")]
    State(#[from] StateError),

    /// The destination's connection secret no longer matches the persisted
    /// fingerprint. Syncing would risk duplicating the whole channel.
    #[error(
        "destination '{destination}' was reconfigured (fingerprint mismatch); \
         refusing to sync it until the fingerprint is reset"
    )]
    FingerprintMismatch { destination: DestinationKey },

    /// Strict mode: the edit target vanished from the endpoint and the
    /// orchestrator is configured not to recreate it.
    #[error(
        "message {remote_id} for '{key}' no longer exists on the endpoint; \
         strict mode requires clearing the item's record before it can be recreated"
    )]
    RemoteMessageMissing { key: ItemKey, remote_id: String },
}
