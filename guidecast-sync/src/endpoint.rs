//! Seam between the orchestrator and the wire client.

use guidecast_transport::client::{EditOutcome, WebhookClient};
use guidecast_transport::error::TransportError;
use guidecast_transport::payload::Attachment;
use guidecast_transport::webhook::Webhook;
use serde_json::Value;

/// The minimum capability set the orchestrator needs from the remote
/// messaging endpoint.
pub trait MessageEndpoint {
    /// Create a message and return its identifier.
    fn create(
        &self,
        webhook: &Webhook,
        payload: &Value,
        files: &[Attachment],
    ) -> Result<String, TransportError>;

    /// Edit a message in place. `Gone` when the id no longer exists.
    fn update(
        &self,
        webhook: &Webhook,
        message_id: &str,
        payload: &Value,
    ) -> Result<EditOutcome, TransportError>;

    /// Delete a message; deleting an already-gone id succeeds.
    fn delete(&self, webhook: &Webhook, message_id: &str) -> Result<(), TransportError>;
}

impl MessageEndpoint for WebhookClient {
    fn create(
        &self,
        webhook: &Webhook,
        payload: &Value,
        files: &[Attachment],
    ) -> Result<String, TransportError> {
        WebhookClient::create(self, webhook, payload, files)
    }

    fn update(
        &self,
        webhook: &Webhook,
        message_id: &str,
        payload: &Value,
    ) -> Result<EditOutcome, TransportError> {
        WebhookClient::update(self, webhook, message_id, payload)
    }

    fn delete(&self, webhook: &Webhook, message_id: &str) -> Result<(), TransportError> {
        WebhookClient::delete(self, webhook, message_id)
    }
}
