//! Typed views over nodes.
//!
//! Each view owns a [`Node`] and a handful of plain fields. [`Noder::get_node`]
//! encodes the fields into a copy of that node; [`TypedView::from_node`]
//! checks the node type and decodes them back.

mod device;
mod file_dir;
mod file_hook;
mod hook;
mod identity;

pub use device::{Device, DATA_TYPE_DEVICE_NAME, DATA_TYPE_DEVICE_URL};
pub use file_dir::{
    Dir, File, FileData, DATA_TYPE_DIR, DATA_TYPE_FILE, DATA_TYPE_FILE_DATA, NODE_TYPE_DIR,
    NODE_TYPE_FILE, NODE_TYPE_FILE_DATA,
};
pub use file_hook::{FileHook, FileHookOps};
pub use hook::{Hook, DATA_TYPE_HOOK_NAME, DATA_TYPE_HOOK_NODE_TYPES};
pub use identity::{Identity, DATA_TYPE_IDENTITY};

use cymi_node::{Node, NodeError, NodeResult, Noder, TypedView};
use cymi_types::NodeId;

use crate::db::Db;
use crate::error::DbResult;

/// Any of the known views, picked by the stored node type.
#[derive(Debug)]
pub enum AnyView {
    Device(Device),
    Identity(Identity),
    Hook(Hook),
    File(File),
    Dir(Dir),
    FileData(FileData),
}

impl AnyView {
    /// Decode `node` as the view registered for its type.
    pub fn from_node(node: Node) -> NodeResult<Self> {
        let t = node.node_type();
        if t == Device::node_type() {
            Device::from_node(node).map(Self::Device)
        } else if t == Identity::node_type() {
            Identity::from_node(node).map(Self::Identity)
        } else if t == Hook::node_type() {
            Hook::from_node(node).map(Self::Hook)
        } else if t == File::node_type() {
            File::from_node(node).map(Self::File)
        } else if t == Dir::node_type() {
            Dir::from_node(node).map(Self::Dir)
        } else if t == FileData::node_type() {
            FileData::from_node(node).map(Self::FileData)
        } else {
            Err(NodeError::UnknownType(t))
        }
    }

    /// Identity of the wrapped view.
    pub fn id(&self) -> NodeId {
        self.inner_node().id()
    }

    fn inner_node(&self) -> &Node {
        match self {
            Self::Device(v) => v.node(),
            Self::Identity(v) => v.node(),
            Self::Hook(v) => v.node(),
            Self::File(v) => v.node(),
            Self::Dir(v) => v.node(),
            Self::FileData(v) => v.node(),
        }
    }
}

impl Noder for AnyView {
    fn get_node(&self) -> NodeResult<Node> {
        match self {
            Self::Device(v) => v.get_node(),
            Self::Identity(v) => v.get_node(),
            Self::Hook(v) => v.get_node(),
            Self::File(v) => v.get_node(),
            Self::Dir(v) => v.get_node(),
            Self::FileData(v) => v.get_node(),
        }
    }
}

/// Children of `parent` whose latest version is a `V`, in link order.
/// Children of any other type are skipped.
pub(crate) fn children_of_type<V: TypedView>(db: &Db, parent: NodeId) -> DbResult<Vec<V>> {
    let mut views = Vec::new();
    for child in db.get_children_nodes(parent)? {
        if child.node_type() == V::node_type() {
            views.push(V::from_node(child)?);
        }
    }
    Ok(views)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cymi_types::NodeType;

    #[test]
    fn dispatch_on_node_type() {
        let cases: Vec<Node> = vec![
            Device::new("laptop", "").get_node().unwrap(),
            Identity::new("alice", vec![]).get_node().unwrap(),
            Hook::new("sync", vec![]).get_node().unwrap(),
            File::new("a.txt", 0o644).get_node().unwrap(),
            Dir::new("/", 0o755).get_node().unwrap(),
            FileData::new(Some(b"hello".to_vec())).get_node().unwrap(),
        ];
        let kinds: Vec<&str> = cases
            .into_iter()
            .map(|node| match AnyView::from_node(node).unwrap() {
                AnyView::Device(_) => "device",
                AnyView::Identity(_) => "identity",
                AnyView::Hook(_) => "hook",
                AnyView::File(_) => "file",
                AnyView::Dir(_) => "dir",
                AnyView::FileData(_) => "filedata",
            })
            .collect();
        assert_eq!(kinds, ["device", "identity", "hook", "file", "dir", "filedata"]);
    }

    #[test]
    fn unregistered_type_is_unknown() {
        let node = Node::new(NodeType::TAG);
        assert!(matches!(
            AnyView::from_node(node),
            Err(NodeError::UnknownType(t)) if t == NodeType::TAG
        ));
        let plain_blob = Node::new(NodeType::BLOB);
        assert!(AnyView::from_node(plain_blob).is_err());
    }

    #[test]
    fn any_view_round_trips_node() {
        let dir = Dir::new("Documents", 0o700);
        let node = dir.get_node().unwrap();
        let view = AnyView::from_node(node.clone()).unwrap();
        assert_eq!(view.id(), dir.id());
        assert_eq!(view.get_node().unwrap(), node);
    }
}
