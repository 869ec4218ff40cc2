//! # guidecast-core
//!
//! Persisted sync state, content fingerprinting, and shared domain types for
//! the guidecast webhook mirror.
//!
//! The state store maps logical item keys to the remote message id and
//! content hash that were in effect after the last successful sync; the
//! fingerprint functions produce the digests that gate all sync decisions.

pub mod cache;
pub mod error;
pub mod fingerprint;
pub mod state;
pub mod types;

pub use error::StateError;
pub use state::{SyncRecord, SyncState};
pub use types::{DestinationKey, ItemKey};
