//! Domain identifiers shared across the workspace.
//!
//! Keys are plain strings at the storage layer; the newtypes keep item and
//! destination identifiers from being mixed up in signatures.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A strongly-typed logical identifier for one mirrored item, unique within
/// its destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemKey(pub String);

impl ItemKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ItemKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ItemKey {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A strongly-typed name for a destination channel endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DestinationKey(pub String);

impl DestinationKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DestinationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for DestinationKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DestinationKey {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}
