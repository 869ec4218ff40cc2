//! Feed document — the collaborator boundary.
//!
//! The scraper/translator side produces a JSON feed listing destinations
//! and prebuilt, already-localized message payloads. Webhook URLs never
//! appear in the feed; each destination names the environment variable that
//! carries its URL, and a destination whose variable is unset is skipped
//! (only configured channels sync).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use guidecast_core::cache::BoundedCache;
use guidecast_sync::{DestinationBatch, Item};
use guidecast_transport::payload::Attachment;
use guidecast_transport::webhook::Webhook;

/// Attachment files referenced more than once (shared screenshots) are read
/// from disk once per run, within this budget.
const FILE_CACHE_CAPACITY: usize = 64;

#[derive(Debug, Deserialize)]
pub struct Feed {
    pub destinations: Vec<FeedDestination>,
}

#[derive(Debug, Deserialize)]
pub struct FeedDestination {
    pub key: String,
    /// Name of the environment variable holding this destination's webhook URL.
    pub webhook_env: String,
    #[serde(default)]
    pub items: Vec<FeedItem>,
}

#[derive(Debug, Deserialize)]
pub struct FeedItem {
    pub key: String,
    pub payload: serde_json::Value,
    #[serde(default)]
    pub files: Vec<FeedFile>,
    /// Collaborator-supplied hash; computed from payload and file bytes
    /// when absent.
    #[serde(default)]
    pub content_hash: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FeedFile {
    pub name: String,
    /// Path relative to the feed document (or absolute).
    pub path: PathBuf,
    pub media_type: String,
}

/// Load and parse the feed document.
pub fn load(path: &Path) -> Result<Feed> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read feed at {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse feed at {}", path.display()))
}

/// Resolve the feed into destination batches, reading attachment bytes and
/// webhook URLs. Destinations whose environment variable is unset are
/// skipped and reported in the second return value.
pub fn into_batches(feed: Feed, feed_dir: &Path) -> Result<(Vec<DestinationBatch>, Vec<String>)> {
    let mut cache: BoundedCache<PathBuf, Vec<u8>> = BoundedCache::new(FILE_CACHE_CAPACITY);
    let mut batches = Vec::new();
    let mut skipped = Vec::new();

    for destination in feed.destinations {
        let url = std::env::var(&destination.webhook_env).unwrap_or_default();
        if url.is_empty() {
            skipped.push(destination.key);
            continue;
        }
        let webhook = Webhook::parse(&url)
            .with_context(|| format!("${} is not a valid webhook URL", destination.webhook_env))?;

        let mut items = Vec::with_capacity(destination.items.len());
        for entry in destination.items {
            let mut files = Vec::with_capacity(entry.files.len());
            for file in entry.files {
                let bytes = read_cached(&mut cache, feed_dir, &file.path)?;
                files.push(Attachment {
                    name: file.name,
                    bytes,
                    media_type: file.media_type,
                });
            }
            items.push(match entry.content_hash {
                Some(hash) => Item::with_hash(entry.key, entry.payload, files, hash),
                None => Item::new(entry.key, entry.payload, files),
            });
        }

        batches.push(DestinationBatch {
            key: destination.key.into(),
            webhook,
            items,
        });
    }

    Ok((batches, skipped))
}

fn read_cached(
    cache: &mut BoundedCache<PathBuf, Vec<u8>>,
    feed_dir: &Path,
    path: &Path,
) -> Result<Vec<u8>> {
    let resolved = if path.is_absolute() {
        path.to_path_buf()
    } else {
        feed_dir.join(path)
    };
    if let Some(bytes) = cache.get(&resolved) {
        return Ok(bytes.clone());
    }
    let bytes = std::fs::read(&resolved)
        .with_context(|| format!("failed to read attachment {}", resolved.display()))?;
    cache.insert(resolved, bytes.clone());
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn write_feed(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join("feed.json");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn parses_a_minimal_feed() {
        let tmp = TempDir::new().unwrap();
        let path = write_feed(
            tmp.path(),
            r#"{
                "destinations": [{
                    "key": "general",
                    "webhook_env": "WEBHOOK_GENERAL",
                    "items": [{"key": "general::faq", "payload": {"content": "hello"}}]
                }]
            }"#,
        );
        let feed = load(&path).unwrap();
        assert_eq!(feed.destinations.len(), 1);
        assert_eq!(feed.destinations[0].items[0].key, "general::faq");
    }

    #[test]
    fn unset_webhook_env_skips_the_destination() {
        let tmp = TempDir::new().unwrap();
        let feed = Feed {
            destinations: vec![FeedDestination {
                key: "ghost".to_string(),
                webhook_env: "GUIDECAST_TEST_UNSET_WEBHOOK".to_string(),
                items: vec![],
            }],
        };
        let (batches, skipped) = into_batches(feed, tmp.path()).unwrap();
        assert!(batches.is_empty());
        assert_eq!(skipped, vec!["ghost".to_string()]);
    }

    #[test]
    fn attachment_bytes_are_read_relative_to_the_feed() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("shots")).unwrap();
        std::fs::write(tmp.path().join("shots/drake.jpg"), b"img-bytes").unwrap();

        let mut cache = BoundedCache::new(4);
        let bytes = read_cached(&mut cache, tmp.path(), Path::new("shots/drake.jpg")).unwrap();
        assert_eq!(bytes, b"img-bytes");

        // Second read is served from the cache even if the file vanishes.
        std::fs::remove_file(tmp.path().join("shots/drake.jpg")).unwrap();
        let again = read_cached(&mut cache, tmp.path(), Path::new("shots/drake.jpg")).unwrap();
        assert_eq!(again, b"img-bytes");
    }

    #[test]
    fn missing_attachment_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let mut cache = BoundedCache::new(4);
        let err = read_cached(&mut cache, tmp.path(), Path::new("nope.jpg")).unwrap_err();
        assert!(err.to_string().contains("nope.jpg"));
    }
}
