//! # guidecast-sync
//!
//! The upsert orchestrator and batch driver: turns a destination's desired
//! items into the minimum set of create/edit/replace calls against its
//! webhook endpoint, gated by content hashes and the destination fingerprint,
//! with state persisted after every successful mutation.

pub mod driver;
pub mod endpoint;
pub mod error;
pub mod gate;
pub mod item;
pub mod upsert;

pub use driver::{run_batch, ItemOutcome, RunSummary};
pub use endpoint::MessageEndpoint;
pub use error::SyncError;
pub use item::{DestinationBatch, Item};
pub use upsert::{upsert_item, RecoveryMode, SyncOptions, UpdateStrategy, UpsertOutcome};
