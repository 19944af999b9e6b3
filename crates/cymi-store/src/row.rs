use serde::{Deserialize, Serialize};

use cymi_types::NodeId;

/// One stored version of a node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRow {
    /// Storage id, assigned by the backend on insert in insertion order.
    pub storage_id: u64,
    pub node_id: NodeId,
    pub node_type: u64,
    pub version: u64,
    /// Creation time of this version, Unix seconds.
    pub date: i64,
    pub data_buf: Vec<u8>,
}

/// One stored link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkRow {
    pub from: NodeId,
    pub to: NodeId,
}
