//! Content and channel fingerprinting.
//!
//! Structured values are serialized in canonical form (recursively key-sorted
//! objects, compact separators) before hashing, so key order never affects a
//! digest. Attachment bytes are digested independently and folded into the
//! item digest, so a changed image with identical text still changes the
//! result.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// SHA-256 hex digest of raw bytes.
pub fn digest_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// SHA-256 hex digest of a structured value in canonical JSON form.
pub fn digest_value(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    digest_bytes(out.as_bytes())
}

/// Digest of a destination's connection secret.
///
/// Only this digest is ever persisted or logged; the secret itself stays out
/// of the state file.
pub fn digest_secret(secret: &str) -> String {
    digest_bytes(secret.trim().as_bytes())
}

/// Item digest: canonical payload plus per-attachment digests, in attachment
/// order. `files` pairs are `(name, bytes)`.
pub fn item_digest(payload: &Value, files: &[(&str, &[u8])]) -> String {
    let folded: Vec<Value> = files
        .iter()
        .map(|(name, bytes)| {
            serde_json::json!({
                "name": name,
                "sha256": digest_bytes(bytes),
            })
        })
        .collect();
    digest_value(&serde_json::json!({
        "payload": payload,
        "files": folded,
    }))
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String((*key).clone()).to_string());
                out.push(':');
                write_canonical(&map[*key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        other => out.push_str(&other.to_string()),
    }
}
