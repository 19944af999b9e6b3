//! The typed-view contract.

use cymi_types::{NodeId, NodeType};

use crate::error::NodeResult;
use crate::node::Node;

/// Anything that can be persisted as a node.
///
/// Implementations encode their current fields into the returned node, so
/// the result always reflects in-memory state at the time of the call.
pub trait Noder {
    fn get_node(&self) -> NodeResult<Node>;
}

/// A domain object that round-trips through exactly one node type.
pub trait TypedView: Noder + Sized {
    /// The node type this view is stored as.
    fn node_type() -> NodeType;

    /// Validate the node's type and decode the view's fields from it.
    fn from_node(node: Node) -> NodeResult<Self>;

    /// The owned node. Its payload is only refreshed by [`Noder::get_node`].
    fn node(&self) -> &Node;

    /// Identity shared by all versions of this view.
    fn id(&self) -> NodeId {
        self.node().id()
    }
}

/// Compare the nodes produced by two noders.
pub fn compare_noders(a: &dyn Noder, b: &dyn Noder) -> NodeResult<bool> {
    let node_a = a.get_node()?;
    let node_b = b.get_node()?;
    Ok(node_a == node_b)
}
