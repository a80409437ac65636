use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the store layer. A missing document is a `None`
/// result, never an error.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("i/o failure on {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to serialize collection {collection}")]
  Serialize {
    collection: String,
    #[source]
    source: serde_json::Error,
  },
}
