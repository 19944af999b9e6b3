use serde::{Deserialize, Serialize};

use cymi_types::NodeId;

/// Directed, unversioned edge between two logical entities.
///
/// Links are used for parent→child hierarchies. Nothing prevents duplicates,
/// cycles, or links to identities that were never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    pub from: NodeId,
    pub to: NodeId,
}

impl Link {
    /// Edge from `from` to `to`.
    pub fn new(from: NodeId, to: NodeId) -> Self {
        Self { from, to }
    }
}
