//! Destination fingerprint gate.
//!
//! A destination's persisted fingerprint must match the digest of its
//! current connection secret before any mutation. A mismatch means the
//! destination was reconfigured since the last run; pushing to it could
//! duplicate the whole channel's content against a different endpoint, so
//! the destination is refused until an operator resets the fingerprint.

use guidecast_core::state::SyncState;
use guidecast_core::types::DestinationKey;
use guidecast_transport::webhook::Webhook;

use crate::error::SyncError;

/// Verify the destination fingerprint, establishing it on first sight.
pub fn verify_destination(
    state: &mut SyncState,
    key: &DestinationKey,
    webhook: &Webhook,
) -> Result<(), SyncError> {
    let current = webhook.fingerprint();
    match state.fingerprints.get(key.as_str()) {
        None => {
            state.fingerprints.insert(key.as_str().to_string(), current);
            Ok(())
        }
        Some(stored) if *stored == current => Ok(()),
        Some(_) => Err(SyncError::FingerprintMismatch {
            destination: key.clone(),
        }),
    }
}
