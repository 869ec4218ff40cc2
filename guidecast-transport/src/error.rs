//! Error types for guidecast-transport.

use thiserror::Error;

use crate::payload::PayloadError;

/// All errors that can arise from webhook transport operations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The webhook URL did not match the expected shape. The URL itself is
    /// never echoed back — it contains the connection secret.
    #[error("invalid webhook URL (expected https://discord.com/api/webhooks/<id>/<token>)")]
    InvalidWebhook,

    /// Retry budget for transient failures (5xx, network) exhausted.
    #[error("transient failures exhausted after {attempts} attempts: {last_error}")]
    TransientExhausted { attempts: u32, last_error: String },

    /// Rate-limit waits would exceed the wall-clock budget for one send.
    #[error("rate-limit waits exceeded the {budget_secs}s send budget")]
    RateLimitBudgetExceeded { budget_secs: u64 },

    /// Non-retryable response status.
    #[error("endpoint returned {status}: {body}")]
    Fatal { status: u16, body: String },

    /// A create succeeded but the response carried no message identifier.
    #[error("endpoint response is missing the message id (wait=true is required)")]
    MissingMessageId,

    /// The payload violates a protocol cap.
    #[error(transparent)]
    Payload(#[from] PayloadError),

    /// Payload serialization failure.
    #[error("payload serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
