use std::sync::LazyLock;

use cymi_node::codec::{decode_record, encode_record};
use cymi_node::{Data, Node, NodeError, NodeResult, Noder, TypedView};
use cymi_types::{DataType, NodeType};

use super::device::utf8;

pub static DATA_TYPE_HOOK_NAME: LazyLock<DataType> =
    LazyLock::new(|| DataType::new("blue.gasser/cybermind/hook/name"));

pub static DATA_TYPE_HOOK_NODE_TYPES: LazyLock<DataType> =
    LazyLock::new(|| DataType::new("blue.gasser/cybermind/hook/nodetypes"));

/// A named attachment point where an external service adds nodes.
///
/// `node_types` lists the kinds of node the hook handles. An empty list is
/// not written at all.
#[derive(Clone, Debug)]
pub struct Hook {
    pub name: String,
    pub node_types: Vec<NodeType>,
    node: Node,
}

impl Hook {
    /// Fresh hook handling `node_types`.
    pub fn new(name: impl Into<String>, node_types: Vec<NodeType>) -> Self {
        Self {
            name: name.into(),
            node_types,
            node: Node::new(NodeType::HOOK),
        }
    }
}

impl Noder for Hook {
    fn get_node(&self) -> NodeResult<Node> {
        let mut datas = vec![Data::new(*DATA_TYPE_HOOK_NAME, self.name.as_bytes())];
        if !self.node_types.is_empty() {
            datas.push(Data::new(
                *DATA_TYPE_HOOK_NODE_TYPES,
                encode_record(&self.node_types)?,
            ));
        }
        let mut node = self.node.clone();
        node.set_datas(datas)?;
        Ok(node)
    }
}

impl TypedView for Hook {
    fn node_type() -> NodeType {
        NodeType::HOOK
    }

    fn from_node(node: Node) -> NodeResult<Self> {
        node.check_type(NodeType::HOOK)?;
        let name = utf8(node.get_data(*DATA_TYPE_HOOK_NAME)?)?;
        let node_types = match node.get_data(*DATA_TYPE_HOOK_NODE_TYPES) {
            Ok(bytes) => decode_record(bytes)?,
            Err(NodeError::MissingData(_)) => Vec::new(),
            Err(e) => return Err(e),
        };
        Ok(Self {
            name,
            node_types,
            node,
        })
    }

    fn node(&self) -> &Node {
        &self.node
    }
}
