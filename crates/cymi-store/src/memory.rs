use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use cymi_types::NodeId;

use crate::error::{StoreError, StoreResult};
use crate::row::{LinkRow, NodeRow};
use crate::traits::Backend;

/// Row tables plus a per-node version index.
///
/// Shared by the in-memory backend and the file backend, which replays its
/// log into one of these on open.
#[derive(Debug, Default)]
pub(crate) struct RowIndex {
    nodes: Vec<NodeRow>,
    /// Positions in `nodes` per node id, in version order.
    versions: HashMap<NodeId, Vec<usize>>,
    links: Vec<LinkRow>,
}

impl RowIndex {
    pub(crate) fn latest_version(&self, id: &NodeId) -> Option<u64> {
        self.latest(id).map(|row| row.version)
    }

    /// Fail unless the latest version of `id` is `expected`.
    pub(crate) fn check_latest(&self, id: &NodeId, expected: Option<u64>) -> StoreResult<()> {
        let actual = self.latest_version(id);
        if actual != expected {
            return Err(StoreError::VersionConflict {
                node: *id,
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// Storage id the next pushed node row will get.
    pub(crate) fn next_storage_id(&self) -> u64 {
        self.nodes.len() as u64 + 1
    }

    pub(crate) fn push_node(&mut self, mut row: NodeRow) -> NodeRow {
        row.storage_id = self.next_storage_id();
        self.versions
            .entry(row.node_id)
            .or_default()
            .push(self.nodes.len());
        self.nodes.push(row.clone());
        row
    }

    pub(crate) fn push_link(&mut self, link: LinkRow) {
        self.links.push(link);
    }

    pub(crate) fn latest(&self, id: &NodeId) -> Option<&NodeRow> {
        self.versions
            .get(id)
            .and_then(|positions| positions.last())
            .map(|&pos| &self.nodes[pos])
    }

    pub(crate) fn all_versions(&self, id: &NodeId) -> Vec<NodeRow> {
        self.versions
            .get(id)
            .map(|positions| positions.iter().map(|&pos| self.nodes[pos].clone()).collect())
            .unwrap_or_default()
    }

    pub(crate) fn first(&self) -> Option<&NodeRow> {
        self.nodes.first()
    }

    pub(crate) fn links_matching(&self, pred: impl Fn(&LinkRow) -> bool) -> Vec<LinkRow> {
        self.links.iter().filter(|l| pred(l)).copied().collect()
    }

    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn link_count(&self) -> usize {
        self.links.len()
    }
}

/// In-memory row store.
///
/// Intended for tests and embedding. Rows are held behind a `RwLock` and
/// cloned on read.
pub struct InMemoryBackend {
    index: RwLock<RowIndex>,
    closed: AtomicBool,
}

impl InMemoryBackend {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            index: RwLock::new(RowIndex::default()),
            closed: AtomicBool::new(false),
        }
    }

    /// Number of node rows (all versions).
    pub fn node_count(&self) -> usize {
        self.index.read().expect("lock poisoned").node_count()
    }

    /// Number of link rows.
    pub fn link_count(&self) -> usize {
        self.index.read().expect("lock poisoned").link_count()
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for InMemoryBackend {
    fn insert_node(&self, row: NodeRow, expected_latest: Option<u64>) -> StoreResult<NodeRow> {
        self.ensure_open()?;
        let mut index = self.index.write().expect("lock poisoned");
        index.check_latest(&row.node_id, expected_latest)?;
        Ok(index.push_node(row))
    }

    fn latest_node(&self, id: &NodeId) -> StoreResult<Option<NodeRow>> {
        self.ensure_open()?;
        Ok(self.index.read().expect("lock poisoned").latest(id).cloned())
    }

    fn node_versions(&self, id: &NodeId) -> StoreResult<Vec<NodeRow>> {
        self.ensure_open()?;
        Ok(self.index.read().expect("lock poisoned").all_versions(id))
    }

    fn first_node(&self) -> StoreResult<Option<NodeRow>> {
        self.ensure_open()?;
        Ok(self.index.read().expect("lock poisoned").first().cloned())
    }

    fn insert_link(&self, link: LinkRow) -> StoreResult<()> {
        self.ensure_open()?;
        self.index.write().expect("lock poisoned").push_link(link);
        Ok(())
    }

    fn links_from(&self, id: &NodeId) -> StoreResult<Vec<LinkRow>> {
        self.ensure_open()?;
        let index = self.index.read().expect("lock poisoned");
        Ok(index.links_matching(|l| l.from == *id))
    }

    fn links_to(&self, id: &NodeId) -> StoreResult<Vec<LinkRow>> {
        self.ensure_open()?;
        let index = self.index.read().expect("lock poisoned");
        Ok(index.links_matching(|l| l.to == *id))
    }

    fn close(&self) -> StoreResult<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBackend")
            .field("node_count", &self.node_count())
            .field("link_count", &self.link_count())
            .finish()
    }
}
