use std::sync::LazyLock;

use cymi_node::{Data, Node, NodeError, NodeResult, Noder, TypedView};
use cymi_types::{DataType, NodeType};

pub static DATA_TYPE_DEVICE_NAME: LazyLock<DataType> =
    LazyLock::new(|| DataType::new("blue.gasser/cybermind/device/name"));

pub static DATA_TYPE_DEVICE_URL: LazyLock<DataType> =
    LazyLock::new(|| DataType::new("blue.gasser/cybermind/device/url"));

/// The device a database lives on. Stored as the first node of every
/// database created with [`crate::Db::create`].
#[derive(Clone, Debug)]
pub struct Device {
    pub name: String,
    pub url: String,
    node: Node,
}

impl Device {
    /// Fresh device with a new identity.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            node: Node::new(NodeType::DEVICE),
        }
    }
}

impl Noder for Device {
    fn get_node(&self) -> NodeResult<Node> {
        let mut node = self.node.clone();
        node.set_datas(vec![
            Data::new(*DATA_TYPE_DEVICE_NAME, self.name.as_bytes()),
            Data::new(*DATA_TYPE_DEVICE_URL, self.url.as_bytes()),
        ])?;
        Ok(node)
    }
}

impl TypedView for Device {
    fn node_type() -> NodeType {
        NodeType::DEVICE
    }

    fn from_node(node: Node) -> NodeResult<Self> {
        node.check_type(NodeType::DEVICE)?;
        let name = utf8(node.get_data(*DATA_TYPE_DEVICE_NAME)?)?;
        let url = match node.get_data(*DATA_TYPE_DEVICE_URL) {
            Ok(bytes) => utf8(bytes)?,
            Err(NodeError::MissingData(_)) => String::new(),
            Err(e) => return Err(e),
        };
        Ok(Self { name, url, node })
    }

    fn node(&self) -> &Node {
        &self.node
    }
}

pub(crate) fn utf8(bytes: &[u8]) -> NodeResult<String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| NodeError::Decode(e.to_string()))
}
