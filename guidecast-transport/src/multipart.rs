//! multipart/form-data encoding for payloads with binary attachments.
//!
//! The endpoint expects the JSON document in a `payload_json` part and each
//! attachment in a `files[i]` part. The boundary is derived from a digest of
//! the content and re-derived until it collides with nothing in the body.

use guidecast_core::fingerprint;

use crate::payload::Attachment;

/// An encoded multipart body with its `Content-Type` header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartBody {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Encode `payload_json` plus attachments into one multipart body.
pub fn encode(payload_json: &str, files: &[Attachment]) -> MultipartBody {
    let boundary = pick_boundary(payload_json, files);

    let mut bytes = Vec::new();
    push_part_header(
        &mut bytes,
        &boundary,
        "form-data; name=\"payload_json\"",
        "application/json",
    );
    bytes.extend_from_slice(payload_json.as_bytes());
    bytes.extend_from_slice(b"\r\n");

    for (i, file) in files.iter().enumerate() {
        push_part_header(
            &mut bytes,
            &boundary,
            &format!(
                "form-data; name=\"files[{i}]\"; filename=\"{}\"",
                sanitize_filename(&file.name)
            ),
            &file.media_type,
        );
        bytes.extend_from_slice(&file.bytes);
        bytes.extend_from_slice(b"\r\n");
    }

    bytes.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    MultipartBody {
        content_type: format!("multipart/form-data; boundary={boundary}"),
        bytes,
    }
}

fn push_part_header(bytes: &mut Vec<u8>, boundary: &str, disposition: &str, content_type: &str) {
    bytes.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    bytes.extend_from_slice(format!("Content-Disposition: {disposition}\r\n").as_bytes());
    bytes.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
}

fn pick_boundary(payload_json: &str, files: &[Attachment]) -> String {
    let mut seed = {
        let mut material = Vec::from(payload_json.as_bytes());
        for file in files {
            material.extend_from_slice(file.name.as_bytes());
            material.extend_from_slice(&file.bytes);
        }
        fingerprint::digest_bytes(&material)
    };

    loop {
        let boundary = format!("guidecast-{}", &seed[..32]);
        let candidate = boundary.as_bytes();
        let collides = contains(payload_json.as_bytes(), candidate)
            || files.iter().any(|f| contains(&f.bytes, candidate));
        if !collides {
            return boundary;
        }
        seed = fingerprint::digest_bytes(seed.as_bytes());
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window == needle)
}

/// Quotes and CR/LF would break the part header.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '"' | '\r' | '\n' | '\\' => '_',
            other => other,
        })
        .collect()
}
