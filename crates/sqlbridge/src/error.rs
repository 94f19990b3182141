//! Errors surfaced by the bridge and its inputs.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// An id did not resolve to any element of the document.
    #[error("no element with id `{0}` in the document")]
    ElementNotFound(String),

    /// The id resolved, but not to a text field.
    #[error("element `{0}` is not a text field")]
    NotAField(String),

    /// The vocabulary did not have the table → [fields] shape.
    #[error("malformed vocabulary: {0}")]
    Vocabulary(#[from] serde_json::Error),

    /// The vocabulary file could not be read.
    #[error("failed to read vocabulary file {}: {source}", path.display())]
    VocabularyIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
