use cymi_types::{DataType, NodeType};

/// Errors from node and payload operations.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    /// The node's declared type is not the one the operation expects.
    #[error("node type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: NodeType, actual: NodeType },

    /// The requested data tag is not present on the node.
    #[error("missing data {0}")]
    MissingData(DataType),

    /// No typed view is registered for this node type.
    #[error("unknown node type {0}")]
    UnknownType(NodeType),

    /// Payload bytes do not parse into the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// A value could not be serialized.
    #[error("encode error: {0}")]
    Encode(String),
}

/// Result alias for node operations.
pub type NodeResult<T> = Result<T, NodeError>;
