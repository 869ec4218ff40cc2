//! Retrying webhook HTTP client.
//!
//! Response classification:
//! - 429 → sleep the server-advised interval (floor 1s, capped per attempt)
//!   and retry; no attempt ceiling, but bounded by a wall-clock budget
//! - 5xx / network error → exponential backoff, bounded attempt budget
//! - 404 → [`Response::NotFound`] when the request tolerates it
//! - any other non-2xx → fatal, no retry
//! - 2xx → decode the body as the remote document when present
//!
//! No local state is mutated here; the only side effects are the network
//! call and the backoff sleeps.

use std::time::{Duration, Instant};

use serde_json::Value;

use crate::error::TransportError;
use crate::multipart::{self, MultipartBody};
use crate::payload::{self, Attachment};
use crate::webhook::{self, Webhook};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(45);
const BODY_EXCERPT_CHARS: usize = 300;

/// Methods the endpoint requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

/// Outcome of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// 2xx, with the decoded remote document when the body carried one.
    Success(Option<Value>),
    /// 404 on a request marked 404-tolerant.
    NotFound,
}

/// Outcome of an edit call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Edited,
    /// The edit target no longer exists on the endpoint.
    Gone,
}

/// Retry tuning for one logical send.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempt budget for 5xx and network-level failures.
    pub max_attempts: u32,
    /// Cap on a single backoff sleep.
    pub backoff_cap: Duration,
    /// Floor for a rate-limit wait.
    pub rate_limit_floor: Duration,
    /// Cap on a single server-advised rate-limit wait.
    pub rate_limit_cap: Duration,
    /// Wall-clock budget across all rate-limit waits of one logical send.
    pub budget: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 6,
            backoff_cap: Duration::from_secs(30),
            rate_limit_floor: Duration::from_secs(1),
            rate_limit_cap: Duration::from_secs(15),
            budget: Duration::from_secs(120),
        }
    }
}

pub(crate) enum Body<'a> {
    Empty,
    Json(&'a Value),
    Multipart(MultipartBody),
}

/// Raw result of one HTTP attempt, before classification.
pub(crate) enum HttpResult {
    /// A status line reached us, with the body text.
    Status(u16, String),
    /// Network-level failure (timeout, reset, DNS, ...).
    Io(String),
}

pub(crate) trait Http {
    fn execute(&self, method: Method, url: &str, body: &Body<'_>) -> HttpResult;
}

pub(crate) trait Sleep {
    fn sleep(&self, duration: Duration);
}

struct UreqHttp {
    agent: ureq::Agent,
}

impl UreqHttp {
    fn new() -> Self {
        UreqHttp {
            agent: ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build(),
        }
    }
}

impl Http for UreqHttp {
    fn execute(&self, method: Method, url: &str, body: &Body<'_>) -> HttpResult {
        let request = self.agent.request(method.as_str(), url);
        let result = match body {
            Body::Empty => request.call(),
            Body::Json(value) => request.send_json(value),
            Body::Multipart(multipart) => request
                .set("Content-Type", &multipart.content_type)
                .send_bytes(&multipart.bytes),
        };
        match result {
            Ok(response) => {
                let status = response.status();
                HttpResult::Status(status, response.into_string().unwrap_or_default())
            }
            Err(ureq::Error::Status(status, response)) => {
                HttpResult::Status(status, response.into_string().unwrap_or_default())
            }
            Err(ureq::Error::Transport(transport)) => HttpResult::Io(transport.to_string()),
        }
    }
}

struct ThreadSleep;

impl Sleep for ThreadSleep {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Client for create/update/delete against channel-bound webhook endpoints.
pub struct WebhookClient {
    http: Box<dyn Http>,
    sleeper: Box<dyn Sleep>,
    policy: RetryPolicy,
}

impl WebhookClient {
    pub fn new() -> Self {
        Self::with_policy(RetryPolicy::default())
    }

    pub fn with_policy(policy: RetryPolicy) -> Self {
        WebhookClient {
            http: Box::new(UreqHttp::new()),
            sleeper: Box::new(ThreadSleep),
            policy,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_backend(
        http: Box<dyn Http>,
        sleeper: Box<dyn Sleep>,
        policy: RetryPolicy,
    ) -> Self {
        WebhookClient {
            http,
            sleeper,
            policy,
        }
    }

    /// Create a message and return its identifier.
    ///
    /// Uses the synchronous create variant; a 2xx response without an id is
    /// fatal because the sync invariant "remote id present ⇒ message exists"
    /// could not be established from it.
    pub fn create(
        &self,
        webhook: &Webhook,
        payload: &Value,
        files: &[Attachment],
    ) -> Result<String, TransportError> {
        payload::validate(payload, files.len())?;
        let url = webhook.create_url();
        match self.send(Method::Post, &url, Some(payload), files, false)? {
            Response::Success(Some(document)) => {
                message_id(&document).ok_or(TransportError::MissingMessageId)
            }
            Response::Success(None) => Err(TransportError::MissingMessageId),
            Response::NotFound => Err(TransportError::Fatal {
                status: 404,
                body: String::new(),
            }),
        }
    }

    /// Edit a message in place. Cannot change attachments.
    pub fn update(
        &self,
        webhook: &Webhook,
        message_id: &str,
        payload: &Value,
    ) -> Result<EditOutcome, TransportError> {
        payload::validate(payload, 0)?;
        let url = webhook.message_url(message_id);
        match self.send(Method::Patch, &url, Some(payload), &[], true)? {
            Response::NotFound => Ok(EditOutcome::Gone),
            Response::Success(_) => Ok(EditOutcome::Edited),
        }
    }

    /// Delete a message. Deleting an already-gone id is success.
    pub fn delete(&self, webhook: &Webhook, message_id: &str) -> Result<(), TransportError> {
        let url = webhook.message_url(message_id);
        self.send(Method::Delete, &url, None, &[], true)?;
        Ok(())
    }

    /// Low-level send: builds the body (multipart when files are present) and
    /// runs the retry loop.
    pub fn send(
        &self,
        method: Method,
        url: &str,
        payload: Option<&Value>,
        files: &[Attachment],
        tolerate_not_found: bool,
    ) -> Result<Response, TransportError> {
        if files.is_empty() {
            return match payload {
                Some(value) => self.send_raw(method, url, &Body::Json(value), tolerate_not_found),
                None => self.send_raw(method, url, &Body::Empty, tolerate_not_found),
            };
        }
        let payload_json = match payload {
            Some(value) => serde_json::to_string(value)?,
            None => "{}".to_string(),
        };
        let body = Body::Multipart(multipart::encode(&payload_json, files));
        self.send_raw(method, url, &body, tolerate_not_found)
    }

    fn send_raw(
        &self,
        method: Method,
        url: &str,
        body: &Body<'_>,
        tolerate_not_found: bool,
    ) -> Result<Response, TransportError> {
        let started = Instant::now();
        let mut slept = Duration::ZERO;
        let mut attempts: u32 = 0;

        loop {
            match self.http.execute(method, url, body) {
                HttpResult::Status(429, body_text) => {
                    let wait = rate_limit_wait(&body_text, &self.policy);
                    if started.elapsed() + slept + wait > self.policy.budget {
                        return Err(TransportError::RateLimitBudgetExceeded {
                            budget_secs: self.policy.budget.as_secs(),
                        });
                    }
                    tracing::warn!("rate limited; waiting {:.1}s", wait.as_secs_f64());
                    self.sleeper.sleep(wait);
                    slept += wait;
                }
                HttpResult::Status(status, _) if (500..600).contains(&status) => {
                    attempts += 1;
                    if attempts >= self.policy.max_attempts {
                        return Err(TransportError::TransientExhausted {
                            attempts,
                            last_error: format!("status {status}"),
                        });
                    }
                    let wait = backoff_delay(attempts, self.policy.backoff_cap);
                    tracing::warn!("server error {status}; retrying in {}s", wait.as_secs());
                    self.sleeper.sleep(wait);
                    slept += wait;
                }
                HttpResult::Status(404, _) if tolerate_not_found => {
                    return Ok(Response::NotFound);
                }
                HttpResult::Status(status, body_text) if (200..300).contains(&status) => {
                    return Ok(Response::Success(serde_json::from_str(&body_text).ok()));
                }
                HttpResult::Status(status, body_text) => {
                    return Err(TransportError::Fatal {
                        status,
                        body: excerpt(&body_text),
                    });
                }
                HttpResult::Io(message) => {
                    attempts += 1;
                    if attempts >= self.policy.max_attempts {
                        return Err(TransportError::TransientExhausted {
                            attempts,
                            last_error: webhook::mask_tokens(&message),
                        });
                    }
                    let wait = backoff_delay(attempts, self.policy.backoff_cap);
                    tracing::warn!("network error; retrying in {}s", wait.as_secs());
                    self.sleeper.sleep(wait);
                    slept += wait;
                }
            }
        }
    }
}

impl Default for WebhookClient {
    fn default() -> Self {
        Self::new()
    }
}

fn message_id(document: &Value) -> Option<String> {
    match document.get("id")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Server-advised wait from a 429 body, defaulting to one second.
fn rate_limit_wait(body: &str, policy: &RetryPolicy) -> Duration {
    let advised = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("retry_after").and_then(Value::as_f64))
        .unwrap_or(1.0);
    Duration::from_secs_f64(advised.max(0.0)).clamp(policy.rate_limit_floor, policy.rate_limit_cap)
}

/// `min(2^attempt, cap)` seconds.
fn backoff_delay(attempt: u32, cap: Duration) -> Duration {
    Duration::from_secs(2u64.saturating_pow(attempt.min(16)).min(cap.as_secs()))
}

fn excerpt(body: &str) -> String {
    let masked = webhook::mask_tokens(body.trim());
    payload::truncate_chars(&masked, BODY_EXCERPT_CHARS).to_string()
}
