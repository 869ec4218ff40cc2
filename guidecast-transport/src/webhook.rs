//! Webhook endpoint identity and URL handling.
//!
//! The token half of a webhook URL is the destination's connection secret.
//! `Display` renders the redacted form; diagnostics that may quote response
//! bodies go through [`mask_tokens`] before leaving this crate.

use std::fmt;

use guidecast_core::fingerprint;

use crate::error::TransportError;

const WEBHOOK_PREFIX: &str = "https://discord.com/api/webhooks/";

/// A parsed channel-bound webhook endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Webhook {
    id: String,
    token: String,
}

impl Webhook {
    /// Parse a webhook URL of the form
    /// `https://discord.com/api/webhooks/<id>/<token>`.
    pub fn parse(url: &str) -> Result<Self, TransportError> {
        let rest = url
            .trim()
            .strip_prefix(WEBHOOK_PREFIX)
            .ok_or(TransportError::InvalidWebhook)?;
        let (id, token) = rest.split_once('/').ok_or(TransportError::InvalidWebhook)?;
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TransportError::InvalidWebhook);
        }
        if token.is_empty() || token.contains('/') {
            return Err(TransportError::InvalidWebhook);
        }
        Ok(Webhook {
            id: id.to_string(),
            token: token.to_string(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn base_url(&self) -> String {
        format!("{WEBHOOK_PREFIX}{}/{}", self.id, self.token)
    }

    /// Create endpoint, in the synchronous "wait for the new message" mode.
    pub fn create_url(&self) -> String {
        format!("{}?wait=true", self.base_url())
    }

    /// Edit/delete endpoint for an existing message.
    pub fn message_url(&self, message_id: &str) -> String {
        format!("{}/messages/{message_id}", self.base_url())
    }

    /// Digest of the connection secret, persisted per destination to detect
    /// reconfiguration between runs.
    pub fn fingerprint(&self) -> String {
        fingerprint::digest_secret(&self.base_url())
    }
}

impl fmt::Display for Webhook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{WEBHOOK_PREFIX}{}/***", self.id)
    }
}

/// Mask the token segment of any webhook URL embedded in `text`.
///
/// Applied to response-body excerpts and network error strings before they
/// reach logs or error values.
pub fn mask_tokens(text: &str) -> String {
    let marker = "/api/webhooks/";
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(marker) {
        let after_marker = pos + marker.len();
        out.push_str(&rest[..after_marker]);
        rest = &rest[after_marker..];

        // Keep the id segment, mask the token segment.
        let id_len = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
        out.push_str(&rest[..id_len]);
        rest = &rest[id_len..];
        if let Some(stripped) = rest.strip_prefix('/') {
            let token_len = stripped
                .bytes()
                .take_while(|b| !matches!(b, b'/' | b'?' | b'"' | b' ' | b'\n'))
                .count();
            out.push_str("/***");
            rest = &stripped[token_len..];
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://discord.com/api/webhooks/123456789/tok-en_ABC";

    #[test]
    fn parses_valid_url() {
        let wh = Webhook::parse(URL).unwrap();
        assert_eq!(wh.id(), "123456789");
        assert_eq!(
            wh.message_url("42"),
            "https://discord.com/api/webhooks/123456789/tok-en_ABC/messages/42"
        );
        assert!(wh.create_url().ends_with("?wait=true"));
    }

    #[test]
    fn rejects_malformed_urls() {
        for bad in [
            "",
            "https://example.com/api/webhooks/1/t",
            "https://discord.com/api/webhooks/notdigits/t",
            "https://discord.com/api/webhooks/123",
            "https://discord.com/api/webhooks/123/",
            "https://discord.com/api/webhooks/123/a/b",
        ] {
            assert!(
                matches!(Webhook::parse(bad), Err(TransportError::InvalidWebhook)),
                "should reject {bad:?}"
            );
        }
    }

    #[test]
    fn display_redacts_token() {
        let wh = Webhook::parse(URL).unwrap();
        let shown = wh.to_string();
        assert!(shown.contains("123456789"));
        assert!(!shown.contains("tok-en_ABC"));
    }

    #[test]
    fn fingerprint_is_stable_and_token_sensitive() {
        let a = Webhook::parse(URL).unwrap();
        let b = Webhook::parse(URL).unwrap();
        let c = Webhook::parse("https://discord.com/api/webhooks/123456789/other").unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn mask_tokens_hides_secret_but_keeps_id() {
        let text = format!("POST {URL}/messages/42 failed");
        let masked = mask_tokens(&text);
        assert!(masked.contains("123456789"));
        assert!(!masked.contains("tok-en_ABC"));
        assert!(masked.contains("/messages/42"));
    }

    #[test]
    fn mask_tokens_handles_urls_inside_json_bodies() {
        let text = r#"{"url": "https://discord.com/api/webhooks/555/secret?wait=true"}"#;
        let masked = mask_tokens(text);
        assert!(!masked.contains("secret"));
        assert!(masked.contains("555/***?wait=true"));
    }

    #[test]
    fn mask_tokens_leaves_plain_text_untouched() {
        assert_eq!(mask_tokens("no webhooks here"), "no webhooks here");
    }
}
