use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use cymi_node::{Node, NodeResult, Noder, TypedView};
use cymi_types::{DataType, NodeType};

pub static DATA_TYPE_IDENTITY: LazyLock<DataType> =
    LazyLock::new(|| DataType::new("blue.gasser/cybermind/data/identity"));

/// A person or account known to the database.
#[derive(Clone, Debug)]
pub struct Identity {
    pub alias: String,
    pub emails: Vec<String>,
    node: Node,
}

#[derive(Serialize, Deserialize)]
struct IdentityRecord {
    alias: String,
    #[serde(default)]
    emails: Vec<String>,
}

impl Identity {
    /// Fresh identity with a new node.
    pub fn new(alias: impl Into<String>, emails: Vec<String>) -> Self {
        Self {
            alias: alias.into(),
            emails,
            node: Node::new(NodeType::IDENTITY),
        }
    }
}

impl Noder for Identity {
    fn get_node(&self) -> NodeResult<Node> {
        let mut node = self.node.clone();
        node.encode_data(
            *DATA_TYPE_IDENTITY,
            &IdentityRecord {
                alias: self.alias.clone(),
                emails: self.emails.clone(),
            },
        )?;
        Ok(node)
    }
}

impl TypedView for Identity {
    fn node_type() -> NodeType {
        NodeType::IDENTITY
    }

    fn from_node(node: Node) -> NodeResult<Self> {
        let record: IdentityRecord = node.decode_node_type(NodeType::IDENTITY, *DATA_TYPE_IDENTITY)?;
        Ok(Self {
            alias: record.alias,
            emails: record.emails,
            node,
        })
    }

    fn node(&self) -> &Node {
        &self.node
    }
}
