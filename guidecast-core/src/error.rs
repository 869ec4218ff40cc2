//! Error types for guidecast-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from state store operations.
#[derive(Debug, Error)]
pub enum StateError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error (state file).
    #[error("state file JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience constructor for [`StateError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StateError {
    StateError::Io {
        path: path.into(),
        source,
    }
}
