use std::path::PathBuf;
use thiserror::Error;

/// Persistence failures for scene documents and tag configurations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document not found: {}", .0.display())]
    DocumentNotFound(PathBuf),

    #[error("failed to write {}: {source}", path.display())]
    DocumentWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to delete {}: {source}", path.display())]
    DocumentDeleteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("{0:?} is not a valid scene name")]
    InvalidName(String),

    #[error("a scene named {0} already exists")]
    SceneExists(String),

    #[error("no scene named {0}")]
    SceneNotFound(String),

    #[error("no tag with id {0}")]
    TagNotFound(String),

    #[error("no tag category {0}")]
    UnknownTagType(String),

    #[error("tag {value} already exists in {tag_type}")]
    DuplicateTag { tag_type: String, value: String },
}
