use std::cell::OnceCell;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

use cymi_types::{DataType, NodeId, NodeType};

use crate::codec;
use crate::data::Data;
use crate::error::{NodeError, NodeResult};
use crate::view::Noder;

/// One version of a logical entity.
///
/// `(id, version)` names a frozen snapshot: once a node is stored, later
/// changes are saved as a new version sharing the same `id`.
///
/// The payloads live in `data_buf`, the encoded form that gets persisted.
/// The decoded sequence is cached on first read and replaced together with
/// the buffer by [`Node::set_datas`], so both always agree.
#[derive(Clone)]
pub struct Node {
    id: NodeId,
    node_type: NodeType,
    version: u64,
    date: i64,
    data_buf: Vec<u8>,
    datas: OnceCell<Vec<Data>>,
}

impl Node {
    /// Create a fresh node: new random identity, version 0, dated now, no data.
    pub fn new(node_type: NodeType) -> Self {
        Self {
            id: NodeId::random(),
            node_type,
            version: 0,
            date: chrono::Utc::now().timestamp(),
            data_buf: Vec::new(),
            datas: OnceCell::new(),
        }
    }

    /// Create a fresh node carrying the given payloads.
    pub fn with_datas(node_type: NodeType, datas: Vec<Data>) -> NodeResult<Self> {
        let mut node = Self::new(node_type);
        node.set_datas(datas)?;
        Ok(node)
    }

    /// Rebuild a node from its stored columns. The buffer is decoded lazily.
    pub fn from_parts(
        id: NodeId,
        node_type: NodeType,
        version: u64,
        date: i64,
        data_buf: Vec<u8>,
    ) -> Self {
        Self {
            id,
            node_type,
            version,
            date,
            data_buf,
            datas: OnceCell::new(),
        }
    }

    /// Identity shared by every version of this entity.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Declared kind of the node.
    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    /// Version number, counting up from 0 per identity.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Creation time of this version, in Unix seconds.
    pub fn date(&self) -> i64 {
        self.date
    }

    /// The encoded payload buffer.
    pub fn data_buf(&self) -> &[u8] {
        &self.data_buf
    }

    /// The decoded payload sequence, decoding the buffer on first access.
    pub fn datas(&self) -> NodeResult<&[Data]> {
        if let Some(datas) = self.datas.get() {
            return Ok(datas);
        }
        let decoded = codec::decode_datas(&self.data_buf)?;
        Ok(self.datas.get_or_init(|| decoded))
    }

    /// Payload of the first entry tagged `data_type`.
    pub fn get_data(&self, data_type: DataType) -> NodeResult<&[u8]> {
        Data::find(self.datas()?, data_type)
            .map(|d| d.data.as_slice())
            .ok_or(NodeError::MissingData(data_type))
    }

    /// Replace all payloads and re-encode the buffer.
    ///
    /// On failure the node is left unchanged.
    pub fn set_datas(&mut self, datas: Vec<Data>) -> NodeResult<()> {
        self.data_buf = codec::encode_datas(&datas)?;
        self.datas = OnceCell::from(datas);
        Ok(())
    }

    /// Fail with [`NodeError::TypeMismatch`] unless this node is of `expected` type.
    pub fn check_type(&self, expected: NodeType) -> NodeResult<()> {
        if self.node_type != expected {
            return Err(NodeError::TypeMismatch {
                expected,
                actual: self.node_type,
            });
        }
        Ok(())
    }

    /// Check the node type, then decode the record stored under `data_type`.
    pub fn decode_node_type<T: DeserializeOwned>(
        &self,
        expected: NodeType,
        data_type: DataType,
    ) -> NodeResult<T> {
        self.check_type(expected)?;
        codec::decode_record(self.get_data(data_type)?)
    }

    /// Encode `value` as the node's only payload, tagged `data_type`.
    ///
    /// Any payload previously on the node is dropped. Views that need several
    /// entries build the full sequence and call [`Node::set_datas`] instead.
    pub fn encode_data<T: Serialize>(&mut self, data_type: DataType, value: &T) -> NodeResult<()> {
        let bytes = codec::encode_record(value)?;
        self.set_datas(vec![Data::new(data_type, bytes)])
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.node_type == other.node_type
            && self.version == other.version
            && self.date == other.date
            && self.data_buf == other.data_buf
    }
}

impl Eq for Node {}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("node_type", &self.node_type)
            .field("version", &self.version)
            .field("date", &self.date)
            .field("data_len", &self.data_buf.len())
            .finish()
    }
}

impl Noder for Node {
    fn get_node(&self) -> NodeResult<Node> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn test_type() -> DataType {
        DataType::new("blue.gasser/test")
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Record {
        name: String,
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    #[test]
    fn new_node_defaults() {
        let node = Node::new(NodeType::BLOB);
        assert_eq!(node.node_type(), NodeType::BLOB);
        assert_eq!(node.version(), 0);
        assert!(node.data_buf().is_empty());
        assert!(node.datas().unwrap().is_empty());
        assert!(node.date() > 0);
    }

    #[test]
    fn new_nodes_get_distinct_ids() {
        assert_ne!(Node::new(NodeType::BLOB).id(), Node::new(NodeType::BLOB).id());
    }

    // -----------------------------------------------------------------------
    // Buffer / cache consistency
    // -----------------------------------------------------------------------

    #[test]
    fn set_datas_encodes_buffer() {
        let mut node = Node::new(NodeType::BLOB);
        assert!(node.data_buf().is_empty());
        node.set_datas(vec![Data::new(test_type(), b"testing".to_vec())]).unwrap();
        assert!(!node.data_buf().is_empty());

        // A node rebuilt from the buffer alone sees the same payload.
        let stored = Node::from_parts(
            node.id(),
            node.node_type(),
            node.version(),
            node.date(),
            node.data_buf().to_vec(),
        );
        assert_eq!(stored.get_data(test_type()).unwrap(), b"testing");
        assert_eq!(stored, node);
    }

    #[test]
    fn set_datas_replaces_cache() {
        let mut node =
            Node::with_datas(NodeType::BLOB, vec![Data::new(test_type(), b"old".to_vec())])
                .unwrap();
        assert_eq!(node.get_data(test_type()).unwrap(), b"old");
        node.set_datas(vec![Data::new(test_type(), b"new".to_vec())]).unwrap();
        assert_eq!(node.get_data(test_type()).unwrap(), b"new");
    }

    #[test]
    fn corrupt_buffer_reports_decode_error() {
        let node = Node::from_parts(NodeId::random(), NodeType::BLOB, 0, 0, vec![0xff; 3]);
        assert!(matches!(node.get_data(test_type()), Err(NodeError::Decode(_))));
    }

    #[test]
    fn get_data_for_absent_tag_is_missing_data() {
        let node =
            Node::with_datas(NodeType::BLOB, vec![Data::new(test_type(), b"x".to_vec())]).unwrap();
        let other = DataType::new("blue.gasser/test/never-written");
        match node.get_data(other) {
            Err(NodeError::MissingData(dt)) => assert_eq!(dt, other),
            other => panic!("expected MissingData, got {other:?}"),
        }
    }

    #[test]
    fn get_data_returns_first_match() {
        let node = Node::with_datas(
            NodeType::BLOB,
            vec![
                Data::new(test_type(), b"first".to_vec()),
                Data::new(test_type(), b"second".to_vec()),
            ],
        )
        .unwrap();
        assert_eq!(node.get_data(test_type()).unwrap(), b"first");
    }

    // -----------------------------------------------------------------------
    // Equality
    // -----------------------------------------------------------------------

    #[test]
    fn equality_is_reflexive_and_symmetric() {
        let a = Node::with_datas(NodeType::TAG, vec![Data::new(test_type(), b"v".to_vec())])
            .unwrap();
        let b = a.clone();
        assert_eq!(a, a);
        assert_eq!(a, b);
        assert_eq!(b, a);
    }

    #[test]
    fn equality_is_sensitive_to_every_field() {
        let base = Node::with_datas(NodeType::TAG, vec![Data::new(test_type(), b"v".to_vec())])
            .unwrap();
        let parts = |n: &Node| (n.id(), n.node_type(), n.version(), n.date(), n.data_buf().to_vec());
        let (id, t, v, d, buf) = parts(&base);

        assert_ne!(base, Node::from_parts(NodeId::random(), t, v, d, buf.clone()));
        assert_ne!(base, Node::from_parts(id, NodeType::BLOB, v, d, buf.clone()));
        assert_ne!(base, Node::from_parts(id, t, v + 1, d, buf.clone()));
        assert_ne!(base, Node::from_parts(id, t, v, d + 1, buf.clone()));
        assert_ne!(base, Node::from_parts(id, t, v, d, Vec::new()));
        assert_eq!(base, Node::from_parts(id, t, v, d, buf));
    }

    // -----------------------------------------------------------------------
    // Typed record encoding
    // -----------------------------------------------------------------------

    #[test]
    fn encode_then_decode_node_type() {
        let mut node = Node::new(NodeType::HOOK);
        let record = Record {
            name: "hook".into(),
        };
        node.encode_data(test_type(), &record).unwrap();
        let decoded: Record = node.decode_node_type(NodeType::HOOK, test_type()).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn decode_node_type_checks_type_first() {
        let mut node = Node::new(NodeType::HOOK);
        node.encode_data(test_type(), &Record { name: "h".into() }).unwrap();
        let err = node
            .decode_node_type::<Record>(NodeType::DEVICE, test_type())
            .unwrap_err();
        assert!(matches!(
            err,
            NodeError::TypeMismatch {
                expected: NodeType::DEVICE,
                actual: NodeType::HOOK
            }
        ));
    }

    #[test]
    fn decode_node_type_missing_and_malformed() {
        let node = Node::new(NodeType::HOOK);
        assert!(matches!(
            node.decode_node_type::<Record>(NodeType::HOOK, test_type()),
            Err(NodeError::MissingData(_))
        ));

        let node = Node::with_datas(NodeType::HOOK, vec![Data::new(test_type(), b"{".to_vec())])
            .unwrap();
        assert!(matches!(
            node.decode_node_type::<Record>(NodeType::HOOK, test_type()),
            Err(NodeError::Decode(_))
        ));
    }

    #[test]
    fn encode_data_replaces_existing_payloads() {
        let other = DataType::new("blue.gasser/test/other");
        let mut node =
            Node::with_datas(NodeType::HOOK, vec![Data::new(other, b"kept?".to_vec())]).unwrap();
        node.encode_data(test_type(), &Record { name: "x".into() }).unwrap();
        assert_eq!(node.datas().unwrap().len(), 1);
        assert!(matches!(node.get_data(other), Err(NodeError::MissingData(_))));
    }

    #[test]
    fn get_node_is_identity() {
        let node = Node::with_datas(NodeType::ACL, vec![Data::new(test_type(), b"a".to_vec())])
            .unwrap();
        assert_eq!(node.get_node().unwrap(), node);
    }
}
