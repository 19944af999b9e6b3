//! Payload encoding.
//!
//! Two strategies coexist:
//!
//! - the whole data sequence of a node is stored as one opaque buffer
//!   ([`encode_datas`] / [`decode_datas`], bincode);
//! - a typed view's field record is stored as a single [`Data`] entry under
//!   the view's own tag ([`encode_record`] / [`decode_record`], JSON).

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::data::Data;
use crate::error::{NodeError, NodeResult};

/// Encode a data sequence into the durable node buffer.
///
/// The empty sequence encodes as the empty buffer.
pub fn encode_datas(datas: &[Data]) -> NodeResult<Vec<u8>> {
    if datas.is_empty() {
        return Ok(Vec::new());
    }
    bincode::serialize(datas).map_err(|e| NodeError::Encode(e.to_string()))
}

/// Decode a durable node buffer. An empty buffer is the empty sequence.
pub fn decode_datas(buf: &[u8]) -> NodeResult<Vec<Data>> {
    if buf.is_empty() {
        return Ok(Vec::new());
    }
    bincode::deserialize(buf).map_err(|e| NodeError::Decode(e.to_string()))
}

/// Encode one record into payload bytes.
pub fn encode_record<T: Serialize>(value: &T) -> NodeResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| NodeError::Encode(e.to_string()))
}

/// Decode payload bytes into a record.
pub fn decode_record<T: DeserializeOwned>(bytes: &[u8]) -> NodeResult<T> {
    serde_json::from_slice(bytes).map_err(|e| NodeError::Decode(e.to_string()))
}
