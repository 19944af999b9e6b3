use std::path::PathBuf;

use thiserror::Error;

use cymi_types::NodeId;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("no stored version of node {0:?}")]
    NotFound(NodeId),

    #[error("database holds no device node")]
    EmptyDatabase,

    #[error("hook root is not a directory: {0}")]
    InvalidHookRoot(PathBuf),

    #[error("config error: {0}")]
    Config(String),

    #[error("node error: {0}")]
    Node(#[from] cymi_node::NodeError),

    #[error("store error: {0}")]
    Store(#[from] cymi_store::StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DbResult<T> = Result<T, DbError>;
