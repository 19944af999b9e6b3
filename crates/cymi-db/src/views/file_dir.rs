//! Files and directories, whether from a real file system or from other
//! sources such as mail attachments.
//!
//! A [`File`] points to its contents through links to [`FileData`] blobs. A
//! `FileData` without bytes is virtual: the contents only exist on the
//! device's own file system.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use cymi_node::{Data, Node, NodeError, NodeResult, Noder, TypedView};
use cymi_types::{Category, DataType, NodeId, NodeType};

use super::children_of_type;
use crate::db::Db;
use crate::error::DbResult;

pub static NODE_TYPE_FILE: LazyLock<NodeType> =
    LazyLock::new(|| Category::Blob.sub_type("blue.gasser/cybermind/file"));
pub static DATA_TYPE_FILE: LazyLock<DataType> =
    LazyLock::new(|| DataType::new("blue.gasser/cybermind/file"));

pub static NODE_TYPE_FILE_DATA: LazyLock<NodeType> =
    LazyLock::new(|| Category::Blob.sub_type("blue.gasser/cybermind/filedata"));
pub static DATA_TYPE_FILE_DATA: LazyLock<DataType> =
    LazyLock::new(|| DataType::new("blue.gasser/cybermind/filedata"));

pub static NODE_TYPE_DIR: LazyLock<NodeType> =
    LazyLock::new(|| Category::Blob.sub_type("blue.gasser/cybermind/dir"));
pub static DATA_TYPE_DIR: LazyLock<DataType> =
    LazyLock::new(|| DataType::new("blue.gasser/cybermind/dir"));

/// Stored fields of a directory.
#[derive(Serialize, Deserialize)]
struct DirRecord {
    name: String,
    mask: u16,
}

/// Stored fields of a file.
#[derive(Serialize, Deserialize)]
struct FileRecord {
    name: String,
    mask: u16,
    #[serde(default = "NodeId::zero")]
    data: NodeId,
}

/// One file. Its contents are linked [`FileData`] nodes.
#[derive(Clone, Debug)]
pub struct File {
    pub name: String,
    /// Unix permission bits.
    pub mask: u16,
    /// The current contents blob. All zeros while the contents are virtual.
    pub data: NodeId,
    node: Node,
}

impl File {
    /// Fresh file with virtual contents.
    pub fn new(name: impl Into<String>, mask: u16) -> Self {
        Self {
            name: name.into(),
            mask,
            data: NodeId::zero(),
            node: Node::new(*NODE_TYPE_FILE),
        }
    }

    /// Point `data` at `contents`, or back to zero if the blob is virtual.
    pub fn set_contents(&mut self, contents: &FileData) {
        self.data = if contents.is_virtual() {
            NodeId::zero()
        } else {
            contents.id()
        };
    }

    /// Latest version of the blob `data` points at. `None` while it is zero.
    pub fn contents(&self, db: &Db) -> DbResult<Option<FileData>> {
        if self.data.is_zero() {
            return Ok(None);
        }
        db.get_view(self.data).map(Some)
    }

    /// Link a contents blob to this file.
    pub fn add_data(&self, db: &Db, data: &FileData) -> DbResult<()> {
        db.add_link(self.id(), data.id())
    }

    /// Contents blobs linked to this file.
    pub fn get_datas(&self, db: &Db) -> DbResult<Vec<FileData>> {
        children_of_type(db, self.id())
    }
}

impl Noder for File {
    fn get_node(&self) -> NodeResult<Node> {
        let mut node = self.node.clone();
        node.encode_data(
            *DATA_TYPE_FILE,
            &FileRecord {
                name: self.name.clone(),
                mask: self.mask,
                data: self.data,
            },
        )?;
        Ok(node)
    }
}

impl TypedView for File {
    fn node_type() -> NodeType {
        *NODE_TYPE_FILE
    }

    fn from_node(node: Node) -> NodeResult<Self> {
        let record: FileRecord = node.decode_node_type(*NODE_TYPE_FILE, *DATA_TYPE_FILE)?;
        Ok(Self {
            name: record.name,
            mask: record.mask,
            data: record.data,
            node,
        })
    }

    fn node(&self) -> &Node {
        &self.node
    }
}

/// A directory. Subdirectories and files hang off it as links.
#[derive(Clone, Debug)]
pub struct Dir {
    pub name: String,
    pub mask: u16,
    node: Node,
}

impl Dir {
    /// Fresh, empty directory.
    pub fn new(name: impl Into<String>, mask: u16) -> Self {
        Self {
            name: name.into(),
            mask,
            node: Node::new(*NODE_TYPE_DIR),
        }
    }

    /// Link `dir` below this directory.
    pub fn add_subdir(&self, db: &Db, dir: &Dir) -> DbResult<()> {
        db.add_link(self.id(), dir.id())
    }

    /// Link `file` into this directory.
    pub fn add_file(&self, db: &Db, file: &File) -> DbResult<()> {
        db.add_link(self.id(), file.id())
    }

    /// Linked children that are directories. Other children are skipped.
    pub fn get_dirs(&self, db: &Db) -> DbResult<Vec<Dir>> {
        children_of_type(db, self.id())
    }

    /// Linked children that are files. Other children are skipped.
    pub fn get_files(&self, db: &Db) -> DbResult<Vec<File>> {
        children_of_type(db, self.id())
    }
}

impl Noder for Dir {
    fn get_node(&self) -> NodeResult<Node> {
        let mut node = self.node.clone();
        node.encode_data(
            *DATA_TYPE_DIR,
            &DirRecord {
                name: self.name.clone(),
                mask: self.mask,
            },
        )?;
        Ok(node)
    }
}

impl TypedView for Dir {
    fn node_type() -> NodeType {
        *NODE_TYPE_DIR
    }

    fn from_node(node: Node) -> NodeResult<Self> {
        let record: DirRecord = node.decode_node_type(*NODE_TYPE_DIR, *DATA_TYPE_DIR)?;
        Ok(Self {
            name: record.name,
            mask: record.mask,
            node,
        })
    }

    fn node(&self) -> &Node {
        &self.node
    }
}

/// Contents of a file. `None` marks a virtual blob.
#[derive(Clone, Debug)]
pub struct FileData {
    pub data: Option<Vec<u8>>,
    node: Node,
}

impl FileData {
    /// Fresh blob. `None` makes it virtual.
    pub fn new(data: Option<Vec<u8>>) -> Self {
        Self {
            data,
            node: Node::new(*NODE_TYPE_FILE_DATA),
        }
    }

    /// Returns `true` if the bytes only live on the device's file system.
    pub fn is_virtual(&self) -> bool {
        self.data.is_none()
    }
}

impl Noder for FileData {
    fn get_node(&self) -> NodeResult<Node> {
        let mut node = self.node.clone();
        if let Some(data) = &self.data {
            node.set_datas(vec![Data::new(*DATA_TYPE_FILE_DATA, data.clone())])?;
        }
        Ok(node)
    }
}

impl TypedView for FileData {
    fn node_type() -> NodeType {
        *NODE_TYPE_FILE_DATA
    }

    fn from_node(node: Node) -> NodeResult<Self> {
        node.check_type(*NODE_TYPE_FILE_DATA)?;
        let data = match node.get_data(*DATA_TYPE_FILE_DATA) {
            Ok(bytes) => Some(bytes.to_vec()),
            Err(NodeError::MissingData(_)) => None,
            Err(e) => return Err(e),
        };
        Ok(Self { data, node })
    }

    fn node(&self) -> &Node {
        &self.node
    }
}
