use cymi_types::NodeId;

/// Errors from backing store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Another version was stored between reading the latest version and writing.
    #[error("version conflict for {node:?}: expected latest {expected:?}, found {actual:?}")]
    VersionConflict {
        node: NodeId,
        expected: Option<u64>,
        actual: Option<u64>,
    },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend has been closed.
    #[error("store is closed")]
    Closed,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
