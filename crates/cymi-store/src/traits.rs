use cymi_types::NodeId;

use crate::error::StoreResult;
use crate::row::{LinkRow, NodeRow};

/// Row storage for node versions and links.
///
/// All implementations must satisfy these invariants:
/// - Node rows are append-only. A stored `(node_id, version)` is never rewritten.
/// - [`Backend::insert_node`] is atomic with respect to other inserts: the
///   latest-version check and the append happen under one lock.
/// - Scans return rows in insertion order.
/// - After [`Backend::close`] every operation fails with `StoreError::Closed`.
pub trait Backend: Send + Sync {
    /// Append a node row if the latest stored version of its node is still
    /// `expected_latest` (`None` meaning no version stored yet).
    ///
    /// Returns the stored row with its storage id assigned, or
    /// `StoreError::VersionConflict` without writing anything.
    fn insert_node(&self, row: NodeRow, expected_latest: Option<u64>) -> StoreResult<NodeRow>;

    /// The row with the highest version for `id`, if any.
    fn latest_node(&self, id: &NodeId) -> StoreResult<Option<NodeRow>>;

    /// All stored versions of `id`, oldest first.
    fn node_versions(&self, id: &NodeId) -> StoreResult<Vec<NodeRow>>;

    /// The first node row ever stored.
    fn first_node(&self) -> StoreResult<Option<NodeRow>>;

    /// Append a link row.
    fn insert_link(&self, link: LinkRow) -> StoreResult<()>;

    /// All links whose `from` is `id`.
    fn links_from(&self, id: &NodeId) -> StoreResult<Vec<LinkRow>>;

    /// All links whose `to` is `id`.
    fn links_to(&self, id: &NodeId) -> StoreResult<Vec<LinkRow>>;

    /// Flush and release the backend.
    fn close(&self) -> StoreResult<()>;
}
