//! Items and destination batches produced by the upstream collaborator.

use guidecast_core::fingerprint;
use guidecast_core::types::{DestinationKey, ItemKey};
use guidecast_transport::payload::Attachment;
use guidecast_transport::webhook::Webhook;
use serde_json::Value;

/// One logical unit of content to keep mirrored as a single remote message.
///
/// The payload is opaque here: it was rendered (and localized) by the
/// collaborator, and only the content hash drives sync decisions.
#[derive(Debug, Clone)]
pub struct Item {
    pub key: ItemKey,
    pub payload: Value,
    pub files: Vec<Attachment>,
    pub content_hash: String,
}

impl Item {
    /// Build an item, computing the content hash over the rendered payload
    /// and attachment bytes.
    pub fn new(key: impl Into<ItemKey>, payload: Value, files: Vec<Attachment>) -> Self {
        let digests: Vec<(&str, &[u8])> = files
            .iter()
            .map(|file| (file.name.as_str(), file.bytes.as_slice()))
            .collect();
        let content_hash = fingerprint::item_digest(&payload, &digests);
        Item {
            key: key.into(),
            payload,
            files,
            content_hash,
        }
    }

    /// Build an item with a collaborator-supplied content hash.
    pub fn with_hash(
        key: impl Into<ItemKey>,
        payload: Value,
        files: Vec<Attachment>,
        content_hash: impl Into<String>,
    ) -> Self {
        Item {
            key: key.into(),
            payload,
            files,
            content_hash: content_hash.into(),
        }
    }
}

/// All items bound for one destination, in collaborator order.
#[derive(Debug, Clone)]
pub struct DestinationBatch {
    pub key: DestinationKey,
    pub webhook: Webhook,
    pub items: Vec<Item>,
}
