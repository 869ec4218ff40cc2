//! # guidecast-transport
//!
//! HTTP transport for channel-bound webhook endpoints: webhook URL parsing
//! with token redaction, wire payload cap validation, multipart attachment
//! encoding, and a retrying client that honours rate-limit hints and backs
//! off on transient failures.

pub mod client;
pub mod error;
pub mod multipart;
pub mod payload;
pub mod webhook;

pub use client::{EditOutcome, Method, Response, RetryPolicy, WebhookClient};
pub use error::TransportError;
pub use payload::Attachment;
pub use webhook::Webhook;
