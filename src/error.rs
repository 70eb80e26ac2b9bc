use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LineageError {
    #[error("invalid snapshot: {0}")]
    Snapshot(#[source] serde_json::Error),

    #[error("invalid config {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("preview lookup for node `{node_id}` failed: {message}")]
    Preview { node_id: String, message: String },

    #[error("snapshot fetch failed: {0}")]
    Fetch(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
