//! Wire payload caps and producer-side text helpers.
//!
//! The payload itself is an opaque JSON document built by the upstream
//! collaborator; this module only checks the protocol caps and flags
//! violations instead of silently corrupting content. Truncation and
//! chunking are the producer's job, via [`truncate_chars`] and
//! [`chunk_lines`].

use serde_json::Value;
use thiserror::Error;

pub const MAX_CONTENT_CHARS: usize = 2000;
pub const MAX_EMBEDS: usize = 10;
pub const MAX_TITLE_CHARS: usize = 256;
pub const MAX_DESCRIPTION_CHARS: usize = 4096;
pub const MAX_FIELDS: usize = 25;
pub const MAX_FIELD_NAME_CHARS: usize = 256;
pub const MAX_FIELD_VALUE_CHARS: usize = 1024;
pub const MAX_ATTACHMENTS: usize = 10;

/// One binary attachment referenced by the payload via `attachment://<name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub bytes: Vec<u8>,
    pub media_type: String,
}

/// A payload (or its attachment set) violating a protocol cap.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("content is {len} characters (max {MAX_CONTENT_CHARS})")]
    ContentTooLong { len: usize },

    #[error("message has {count} embeds (max {MAX_EMBEDS})")]
    TooManyEmbeds { count: usize },

    #[error("embed {index} title is {len} characters (max {MAX_TITLE_CHARS})")]
    TitleTooLong { index: usize, len: usize },

    #[error("embed {index} description is {len} characters (max {MAX_DESCRIPTION_CHARS})")]
    DescriptionTooLong { index: usize, len: usize },

    #[error("embed {index} has {count} fields (max {MAX_FIELDS})")]
    TooManyFields { index: usize, count: usize },

    #[error("embed {index} field {field} name is {len} characters (max {MAX_FIELD_NAME_CHARS})")]
    FieldNameTooLong { index: usize, field: usize, len: usize },

    #[error("embed {index} field {field} value is {len} characters (max {MAX_FIELD_VALUE_CHARS})")]
    FieldValueTooLong { index: usize, field: usize, len: usize },

    #[error("message has {count} attachments (max {MAX_ATTACHMENTS})")]
    TooManyAttachments { count: usize },
}

/// Check a payload and its attachment count against the protocol caps.
///
/// Unknown keys pass through untouched; only the capped fields are examined.
pub fn validate(payload: &Value, attachment_count: usize) -> Result<(), PayloadError> {
    if attachment_count > MAX_ATTACHMENTS {
        return Err(PayloadError::TooManyAttachments {
            count: attachment_count,
        });
    }

    if let Some(len) = str_len(payload.get("content")) {
        if len > MAX_CONTENT_CHARS {
            return Err(PayloadError::ContentTooLong { len });
        }
    }

    let Some(embeds) = payload.get("embeds").and_then(Value::as_array) else {
        return Ok(());
    };
    if embeds.len() > MAX_EMBEDS {
        return Err(PayloadError::TooManyEmbeds {
            count: embeds.len(),
        });
    }

    for (index, embed) in embeds.iter().enumerate() {
        if let Some(len) = str_len(embed.get("title")) {
            if len > MAX_TITLE_CHARS {
                return Err(PayloadError::TitleTooLong { index, len });
            }
        }
        if let Some(len) = str_len(embed.get("description")) {
            if len > MAX_DESCRIPTION_CHARS {
                return Err(PayloadError::DescriptionTooLong { index, len });
            }
        }
        let Some(fields) = embed.get("fields").and_then(Value::as_array) else {
            continue;
        };
        if fields.len() > MAX_FIELDS {
            return Err(PayloadError::TooManyFields {
                index,
                count: fields.len(),
            });
        }
        for (field, entry) in fields.iter().enumerate() {
            if let Some(len) = str_len(entry.get("name")) {
                if len > MAX_FIELD_NAME_CHARS {
                    return Err(PayloadError::FieldNameTooLong { index, field, len });
                }
            }
            if let Some(len) = str_len(entry.get("value")) {
                if len > MAX_FIELD_VALUE_CHARS {
                    return Err(PayloadError::FieldValueTooLong { index, field, len });
                }
            }
        }
    }

    Ok(())
}

fn str_len(value: Option<&Value>) -> Option<usize> {
    value
        .and_then(Value::as_str)
        .map(|s| s.chars().count())
}

/// Truncate to at most `max` characters, on a character boundary.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Split text into chunks of at most `max_chars` characters, keeping lines
/// whole where possible. A single line longer than `max_chars` becomes its
/// own (oversized) chunk; callers cap such lines with [`truncate_chars`].
pub fn chunk_lines(text: &str, max_chars: usize) -> Vec<String> {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return if text.is_empty() {
            Vec::new()
        } else {
            vec![text.to_string()]
        };
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;
    for line in text.split('\n') {
        let line_len = line.chars().count() + 1;
        if current_len + line_len > max_chars && !current.is_empty() {
            push_chunk(&mut chunks, &current);
            current.clear();
            current_len = 0;
        }
        current.push_str(line);
        current.push('\n');
        current_len += line_len;
    }
    push_chunk(&mut chunks, &current);
    chunks
}

fn push_chunk(chunks: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn embed_payload() -> Value {
        json!({
            "content": "**Drake — Guide**",
            "embeds": [{
                "title": "Drake",
                "description": "• Weak point: tail\n• Phase 2 at 50% HP",
                "image": {"url": "attachment://drake.jpg"},
                "fields": [{"name": "Stats", "value": "• HP: 12000"}],
            }],
        })
    }

    #[test]
    fn typical_payload_passes() {
        assert_eq!(validate(&embed_payload(), 1), Ok(()));
    }

    #[test]
    fn payload_without_embeds_passes() {
        assert_eq!(validate(&json!({"content": "hello"}), 0), Ok(()));
    }

    #[test]
    fn overlong_title_is_flagged() {
        let mut payload = embed_payload();
        payload["embeds"][0]["title"] = Value::String("x".repeat(257));
        assert_eq!(
            validate(&payload, 0),
            Err(PayloadError::TitleTooLong {
                index: 0,
                len: 257
            })
        );
    }

    #[test]
    fn overlong_description_is_flagged() {
        let mut payload = embed_payload();
        payload["embeds"][0]["description"] = Value::String("x".repeat(4097));
        assert!(matches!(
            validate(&payload, 0),
            Err(PayloadError::DescriptionTooLong { index: 0, .. })
        ));
    }

    #[test]
    fn too_many_fields_is_flagged() {
        let mut payload = embed_payload();
        let field = json!({"name": "n", "value": "v"});
        payload["embeds"][0]["fields"] = Value::Array(vec![field; 26]);
        assert_eq!(
            validate(&payload, 0),
            Err(PayloadError::TooManyFields {
                index: 0,
                count: 26
            })
        );
    }

    #[test]
    fn too_many_attachments_is_flagged() {
        assert_eq!(
            validate(&embed_payload(), 11),
            Err(PayloadError::TooManyAttachments { count: 11 })
        );
    }

    #[test]
    fn caps_count_characters_not_bytes() {
        let mut payload = embed_payload();
        // 256 two-byte characters: fine by character count.
        payload["embeds"][0]["title"] = Value::String("é".repeat(256));
        assert_eq!(validate(&payload, 0), Ok(()));
    }

    #[test]
    fn truncate_respects_character_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        assert_eq!(chunk_lines("one\ntwo", 100), vec!["one\ntwo".to_string()]);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(chunk_lines("  \n ", 100).is_empty());
    }

    #[test]
    fn chunks_split_on_line_boundaries() {
        let text = "aaaa\nbbbb\ncccc";
        let chunks = chunk_lines(text, 10);
        assert_eq!(chunks, vec!["aaaa\nbbbb".to_string(), "cccc".to_string()]);
    }

    #[test]
    fn chunks_rejoin_to_original_lines() {
        let text = "alpha\nbeta\ngamma\ndelta\nepsilon";
        let chunks = chunk_lines(text, 12);
        let rejoined = chunks.join("\n");
        assert_eq!(rejoined, text);
    }
}
