use serde::{Deserialize, Serialize};

use cymi_types::DataType;

/// One tagged payload attached to a node.
///
/// The store never interprets `data`; only the typed view owning the tag does.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Data {
    /// Kind of payload.
    pub data_type: DataType,
    /// Opaque payload bytes.
    pub data: Vec<u8>,
}

impl Data {
    /// Create a new payload.
    pub fn new(data_type: DataType, data: impl Into<Vec<u8>>) -> Self {
        Self {
            data_type,
            data: data.into(),
        }
    }

    /// First entry in `datas` carrying `data_type`.
    pub fn find(datas: &[Data], data_type: DataType) -> Option<&Data> {
        datas.iter().find(|d| d.data_type == data_type)
    }
}
